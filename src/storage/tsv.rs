//! Tab-separated node and edge files.
//!
//! Cells are raw text: quoting is disabled on read and write, so quote
//! characters pass through literally and cells may not contain tabs or
//! newlines. Rows that do not line up with the header are healed when
//! possible (extra trailing fields fold into a final text column), otherwise
//! dropped and counted; the count is reported, never swallowed.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::BTreeMap;
use std::path::Path;

use crate::{
    error::PubNetError,
    naming::{
        edge_header, edge_header_parts, feature_label, feature_label_parts, node_id_label,
        node_id_label_parts,
    },
    network::{EdgeSet, NodeSet},
    properties::{FeatureColumn, FeatureKind, NodeId, Representation},
};

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, PubNetError> {
    Ok(ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(false)
        .from_path(path)?)
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, PubNetError> {
    Ok(WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_path(path)?)
}

/// Line up a record with the expected column count. Extra trailing fields
/// can only be reconciled into a final text column; anything else is
/// unrecoverable and the row is dropped by the caller.
fn heal_fields(
    record: &StringRecord,
    expected: usize,
    last_is_text: bool,
) -> Result<Vec<String>, PubNetError> {
    if record.len() == expected {
        return Ok(record.iter().map(str::to_string).collect());
    }
    if record.len() > expected && last_is_text {
        let mut fields: Vec<String> = record
            .iter()
            .take(expected - 1)
            .map(str::to_string)
            .collect();
        let tail: Vec<&str> = record.iter().skip(expected - 1).collect();
        fields.push(tail.join("\t"));
        return Ok(fields);
    }
    Err(PubNetError::MalformedRecord(format!(
        "row has {} fields, expected {expected}",
        record.len()
    )))
}

fn parse_id(raw: &str) -> Result<NodeId, PubNetError> {
    raw.trim().parse::<NodeId>().map_err(|err| {
        PubNetError::MalformedRecord(format!("expected integer id, got '{raw}': {err}"))
    })
}

/// Parse one row's feature cells into staged values, only committing to the
/// columns once the whole row parsed; a half-pushed row would shear the
/// columns out of alignment.
fn push_features(
    fields: &[String],
    columns: &mut [FeatureColumn],
) -> Result<(), PubNetError> {
    let mut staged = Vec::with_capacity(columns.len());
    for (raw, column) in fields.iter().zip(columns.iter()) {
        let mut probe = FeatureColumn::empty(column.kind());
        probe.push_parse(raw)?;
        staged.push(probe.value(0).expect("just pushed"));
    }
    for (value, column) in staged.into_iter().zip(columns.iter_mut()) {
        column.push(value)?;
    }
    Ok(())
}

pub(crate) fn read_nodes(path: &Path) -> Result<NodeSet, PubNetError> {
    let mut reader = reader(path)?;
    let mut records = reader.records();
    let header = records
        .next()
        .ok_or_else(|| PubNetError::MalformedRecord(format!("{path:?} is empty")))??;
    let mut header_columns = header.iter();
    let id_label = header_columns.next().ok_or_else(|| {
        PubNetError::MalformedRecord(format!("{path:?} has no id column in its header"))
    })?;
    let (_, name) = node_id_label_parts(id_label)?;
    let specs: Vec<(String, FeatureKind)> = header_columns.map(feature_label_parts).collect();

    let expected = 1 + specs.len();
    let last_is_text = specs
        .last()
        .map(|(_, kind)| *kind == FeatureKind::Text)
        .unwrap_or(false);

    let mut ids: Vec<NodeId> = Vec::new();
    let mut columns: Vec<FeatureColumn> = specs
        .iter()
        .map(|(_, kind)| FeatureColumn::empty(*kind))
        .collect();
    let mut dropped = 0usize;

    for record in records {
        let parsed = record
            .map_err(PubNetError::from)
            .and_then(|record| heal_fields(&record, expected, last_is_text))
            .and_then(|fields| {
                let id = parse_id(&fields[0])?;
                push_features(&fields[1..], &mut columns)?;
                ids.push(id);
                Ok(())
            });
        if let Err(err) = parsed {
            dropped += 1;
            tracing::debug!("dropping row in {path:?}: {err}");
        }
    }
    if dropped > 0 {
        tracing::warn!("dropped {dropped} malformed rows reading {path:?}");
    }

    let features: BTreeMap<String, FeatureColumn> = specs
        .into_iter()
        .map(|(name, _)| name)
        .zip(columns)
        .collect();
    NodeSet::new(name, ids, features)
}

pub(crate) fn write_nodes(nodes: &NodeSet, path: &Path) -> Result<(), PubNetError> {
    let mut writer = writer(path)?;
    let mut header = vec![node_id_label("id", nodes.name())];
    for (name, column) in nodes.features() {
        header.push(feature_label(name, column.kind()));
    }
    writer.write_record(&header)?;

    for (row, id) in nodes.ids().iter().enumerate() {
        let mut record = vec![id.to_string()];
        for column in nodes.features().values() {
            let value = column.value(row).ok_or_else(|| {
                PubNetError::Construction(format!(
                    "feature column shorter than id column in node set '{}'",
                    nodes.name()
                ))
            })?;
            record.push(value.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn read_edges(path: &Path) -> Result<EdgeSet, PubNetError> {
    let mut reader = reader(path)?;
    let mut records = reader.records();
    let header_record = records
        .next()
        .ok_or_else(|| PubNetError::MalformedRecord(format!("{path:?} is empty")))??;
    let header_line: Vec<&str> = header_record.iter().collect();
    let header = edge_header_parts(&header_line.join("\t"))?;

    let expected = 2 + header.features.len();
    let last_is_text = header
        .features
        .last()
        .map(|(_, kind)| *kind == FeatureKind::Text)
        .unwrap_or(false);

    let mut starts: Vec<NodeId> = Vec::new();
    let mut ends: Vec<NodeId> = Vec::new();
    let mut columns: Vec<FeatureColumn> = header
        .features
        .iter()
        .map(|(_, kind)| FeatureColumn::empty(*kind))
        .collect();
    let mut dropped = 0usize;

    for record in records {
        let parsed = record
            .map_err(PubNetError::from)
            .and_then(|record| heal_fields(&record, expected, last_is_text))
            .and_then(|fields| {
                let first = parse_id(&fields[0])?;
                let second = parse_id(&fields[1])?;
                push_features(&fields[2..], &mut columns)?;
                if header.reverse {
                    starts.push(second);
                    ends.push(first);
                } else {
                    starts.push(first);
                    ends.push(second);
                }
                Ok(())
            });
        if let Err(err) = parsed {
            dropped += 1;
            tracing::debug!("dropping row in {path:?}: {err}");
        }
    }
    if dropped > 0 {
        tracing::warn!("dropped {dropped} malformed rows reading {path:?}");
    }

    let features: BTreeMap<String, FeatureColumn> = header
        .features
        .into_iter()
        .map(|(name, _)| name)
        .zip(columns)
        .collect();
    EdgeSet::from_columns(
        &header.start_type,
        &header.end_type,
        header.directed,
        starts,
        ends,
        features,
        Representation::Array,
    )
}

pub(crate) fn write_edges(edges: &EdgeSet, path: &Path) -> Result<(), PubNetError> {
    let mut writer = writer(path)?;
    let specs: Vec<(String, FeatureKind)> = edges
        .features()
        .iter()
        .map(|(name, column)| (name.clone(), column.kind()))
        .collect();
    let header = edge_header(
        edges.start_type(),
        edges.end_type(),
        &specs,
        edges.is_directed(),
    );
    writer.write_record(header.split('\t'))?;

    for (row, (start, end)) in edges.rows().enumerate() {
        let mut record = vec![start.to_string(), end.to_string()];
        for column in edges.features().values() {
            let value = column.value(row).ok_or_else(|| {
                PubNetError::Construction(format!(
                    "feature column shorter than id columns in edge set '{}'",
                    edges.key()
                ))
            })?;
            record.push(value.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
