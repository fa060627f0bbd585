//! Outbound formatting: scanned rows into wire-shaped JSON, including
//! relationship resolution and the money/date/id conventions.

use super::denorm::{self, MappedRow, RawObject};

use tabula_core::descriptor::{Field, TypeDescriptor};
use tabula_core::{Descriptor, Error, Result, SchemaMapping, Value};

use chrono::SecondsFormat;
use std::collections::HashMap;

/// Converts the fanned-out rows of one fetch into wire objects, one per
/// distinct parent. Resource fields are keyed by their wire key, never by
/// the source column.
pub(crate) fn format_rows(
    descriptor: &Descriptor,
    td: &TypeDescriptor,
    mapping: &SchemaMapping,
    rows: &[Vec<Value>],
) -> Result<Vec<serde_json::Value>> {
    let mapped: Vec<MappedRow> = rows.iter().map(|row| denorm::map_row(mapping, row)).collect();

    // Group fan-out rows by parent identity before resolving, so a
    // collection fetch yields one object per distinct parent row.
    let mut groups: Vec<(String, Vec<&MappedRow>)> = Vec::new();
    for row in &mapped {
        let identity = parent_identity(td, row);
        match groups.iter_mut().find(|(key, _)| *key == identity) {
            Some((_, group)) => group.push(row),
            None => groups.push((identity, vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(_, group)| resolve_group(descriptor, td, &group))
        .collect()
}

fn parent_identity(td: &TypeDescriptor, row: &MappedRow) -> String {
    row.segment(&td.table_name)
        .and_then(|values| {
            values
                .iter()
                .find(|(column, _)| *column == td.unique_id_column)
                .map(|(_, value)| value.to_wire_string())
        })
        .unwrap_or_default()
}

/// Resolves one parent object from its fan-out rows: formats the parent's
/// own columns and attaches each relationship's deduplicated collection.
fn resolve_group(
    descriptor: &Descriptor,
    td: &TypeDescriptor,
    group: &[&MappedRow],
) -> Result<serde_json::Value> {
    let mut attachments = HashMap::new();

    for field in td.relationship_fields() {
        let Some(rel) = field.relationship.as_ref() else {
            continue;
        };
        let related = descriptor
            .type_descriptor_by_table(&rel.with_table)
            .ok_or_else(|| {
                Error::template(format!(
                    "relationship table '{}' is not declared by the descriptor",
                    rel.with_table
                ))
            })?;

        let mut related_objects = Vec::new();
        for row in group {
            let Some(values) = row.segment(&rel.with_table) else {
                continue;
            };
            if denorm::is_vacant(values) {
                continue;
            }
            related_objects.push(format_object(related, values, &HashMap::new()));
        }
        let deduped = denorm::dedupe(related_objects);

        let value = if rel.kind.is_collection() {
            serde_json::Value::Array(deduped)
        } else {
            deduped
                .into_iter()
                .next()
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()))
        };
        attachments.insert(field.key.clone(), value);
    }

    let parent = group
        .first()
        .and_then(|row| row.segment(&td.table_name))
        .ok_or_else(|| {
            Error::template(format!(
                "no '{}' segment in mapped row",
                td.table_name
            ))
        })?;

    Ok(format_object(td, parent, &attachments))
}

/// Formats one table's sub-object. Fields walk in declaration order;
/// relationship fields take their attachment when one was resolved, money
/// fields assemble their amount/currency pair, and everything else formats
/// as a scalar.
fn format_object(
    td: &TypeDescriptor,
    values: &RawObject,
    attachments: &HashMap<String, serde_json::Value>,
) -> serde_json::Value {
    let mut out = serde_json::Map::new();

    for field in &td.fields {
        if field.is_relationship() {
            if let Some(attached) = attachments.get(&field.key) {
                out.insert(field.key.clone(), attached.clone());
            }
            continue;
        }

        if field.is_money() {
            if let Some(money) = format_money(field, values) {
                out.insert(field.key.clone(), money);
            }
            continue;
        }

        let Some(column) = field.from_column.as_deref() else {
            continue;
        };
        let Some(raw) = lookup(values, column) else {
            continue;
        };
        let is_id = column == td.unique_id_column;
        out.insert(field.key.clone(), scalar(raw, is_id));
    }

    serde_json::Value::Object(out)
}

fn format_money(field: &Field, values: &RawObject) -> Option<serde_json::Value> {
    let amount_spec = field.ty.amount.as_ref()?;
    let amount = lookup(values, &amount_spec.from_column)?;

    let mut money = serde_json::Map::new();
    money.insert(amount_spec.key.clone(), scalar(amount, false));

    if let Some(currency) = field.ty.currency.as_ref() {
        let value = match (&currency.value, &currency.from_column) {
            (Some(literal), _) => serde_json::Value::String(literal.clone()),
            (None, Some(column)) => lookup(values, column)
                .map(|raw| scalar(raw, false))
                .unwrap_or(serde_json::Value::Null),
            (None, None) => serde_json::Value::Null,
        };
        money.insert(currency.key.clone(), value);
    }

    Some(serde_json::Value::Object(money))
}

fn lookup<'a>(values: &'a RawObject, column: &str) -> Option<&'a Value> {
    values
        .iter()
        .find(|(name, _)| name == column)
        .map(|(_, value)| value)
}

/// One scanned value onto the wire. Unique-id columns always stringify;
/// timestamps format as ISO-8601 with milliseconds and `Z`.
pub(crate) fn scalar(value: &Value, stringify: bool) -> serde_json::Value {
    if value.is_null() {
        return serde_json::Value::Null;
    }
    if stringify {
        return serde_json::Value::String(value.to_wire_string());
    }

    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::I64(v) => serde_json::Value::Number((*v).into()),
        Value::F64(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(v) => serde_json::Value::String(v.clone()),
        Value::Bytes(v) => serde_json::Value::String(String::from_utf8_lossy(v).into_owned()),
        Value::Timestamp(v) => {
            serde_json::Value::String(v.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
    }
}
