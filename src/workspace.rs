//! A flat, ordered collection of records and its IDF-style text form.
//!
//! The text form is one object per `;`-terminated statement: the object type first, then the
//! field values in schema order separated by commas. Anything after `!` on a line is a comment.
//! An empty field is absent; trailing absent fields are omitted on write.

use crate::errors::FieldError;
use crate::record::{FieldValue, Record};
use crate::schema::{FieldKind, SchemaRegistry};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::io::Read;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Could not read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object '{object_type}' starting at line {line} is not terminated by ';'")]
    Unterminated { object_type: String, line: usize },
    #[error("Object '{object_type}' at line {line} has {found} fields but its schema declares {expected}")]
    TooManyFields {
        object_type: String,
        line: usize,
        found: usize,
        expected: usize,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workspace {
    records: Vec<Record>,
}

impl Workspace {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Appends a record, returning its index.
    pub fn push(&mut self, record: Record) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn objects_by_type(&self, object_type: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| record.object_type().eq_ignore_ascii_case(object_type))
            .collect()
    }

    /// Index of the first record with the given name, of any type.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    /// Resolves an object reference field of the record at `index` to the index of the record it
    /// names. Only records of a type the field accepts are considered, and a name matched by more
    /// than one of them resolves to nothing.
    pub fn get_target(&self, index: usize, field: &str) -> Option<usize> {
        match self.targets(index, field).as_slice() {
            [target] => Some(*target),
            _ => None,
        }
    }

    /// Every record an object reference field of the record at `index` could name.
    pub fn targets(&self, index: usize, field: &str) -> Vec<usize> {
        let Some(record) = self.records.get(index) else {
            return vec![];
        };
        let Some(spec) = record
            .schema()
            .field_index(field)
            .ok()
            .and_then(|field_index| record.schema().field(field_index))
            .filter(|spec| spec.kind() == FieldKind::ObjectReference)
        else {
            return vec![];
        };
        let Some(name) = record.get(field).and_then(FieldValue::as_str) else {
            return vec![];
        };

        self.records
            .iter()
            .enumerate()
            .filter(|(_, candidate)| {
                spec.references_type(candidate.object_type())
                    && candidate
                        .name()
                        .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|(target, _)| target)
            .collect()
    }

    /// Reads IDF-style text. Objects of an unknown type are skipped with a warning, as are field
    /// values that cannot be read as their field's kind (the field is left absent).
    pub fn parse(text: &str, registry: &SchemaRegistry) -> Result<Self, ParseError> {
        let mut workspace = Self::new();

        for statement in statements(text)? {
            let Statement { line, fields } = statement;
            let (object_type, values) = match fields.split_first() {
                Some((object_type, values)) if !object_type.is_empty() => (*object_type, values),
                _ => continue,
            };
            let schema = match registry.schema_for(object_type) {
                Ok(schema) => schema,
                Err(e) => {
                    warn!("{e}; skipping object at line {line}");
                    continue;
                }
            };
            let trailing_empty = values.iter().rev().take_while(|v| v.is_empty()).count();
            let values = &values[..values.len() - trailing_empty];
            if values.len() > schema.fields().len() {
                return Err(ParseError::TooManyFields {
                    object_type: schema.object_type().to_string(),
                    line,
                    found: values.len(),
                    expected: schema.fields().len(),
                });
            }

            let mut record = Record::new(schema);
            for (index, value) in values.iter().enumerate() {
                if let Err(e) = record.set_text_by_index(index, value) {
                    match e {
                        FieldError::TypeMismatch { .. } => {
                            warn!("{e} at line {line}; the field is left unset")
                        }
                        FieldError::UnknownField { .. } | FieldError::NotSettable(_) => {
                            warn!("{e} at line {line}")
                        }
                    }
                }
            }
            workspace.push(record);
        }

        Ok(workspace)
    }

    pub fn from_reader(
        mut reader: impl Read,
        registry: &SchemaRegistry,
    ) -> Result<Self, ParseError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text, registry)
    }

    pub fn to_idf_string(&self) -> String {
        self.records.iter().map(record_to_idf).join("\n")
    }

    /// The records as an epJSON-style document: object type, then object name, then the set
    /// fields other than the name. Unnamed records are keyed `"<type> <n>"`. A record whose key
    /// is already taken is left out with a warning.
    pub fn to_epjson(&self) -> serde_json::Value {
        let mut document = serde_json::Map::new();
        let mut unnamed = IndexMap::<&str, usize>::new();

        for record in &self.records {
            let key = match record.name() {
                Some(name) => name.to_string(),
                None => {
                    let count = unnamed.entry(record.object_type()).or_default();
                    *count += 1;
                    format!("{} {count}", record.object_type())
                }
            };
            let objects = document
                .entry(record.object_type())
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
            let Some(objects) = objects.as_object_mut() else {
                continue;
            };
            if objects.keys().any(|taken| taken.eq_ignore_ascii_case(&key)) {
                warn!(
                    "{} shares its name with an earlier record and is left out of the epJSON",
                    record.brief_description()
                );
                continue;
            }

            let fields = record
                .set_fields()
                .filter(|(index, _, _)| record.schema().name_field() != Some(*index))
                .map(|(_, field, value)| (field.name().to_string(), epjson_value(value)))
                .collect::<serde_json::Map<_, _>>();
            objects.insert(key, serde_json::Value::Object(fields));
        }

        serde_json::Value::Object(document)
    }
}

fn epjson_value(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::String(string) => string.as_str().into(),
        FieldValue::Integer(int) => (*int).into(),
        FieldValue::Real(real) => (*real).into(),
        FieldValue::Boolean(boolean) => (*boolean).into(),
    }
}

impl Display for Workspace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_idf_string())
    }
}

struct Statement<'a> {
    line: usize,
    fields: Vec<&'a str>,
}

/// Splits text into `;`-terminated statements with comments removed, remembering the line each
/// statement starts on.
fn statements(text: &str) -> Result<Vec<Statement<'_>>, ParseError> {
    let mut statements = vec![];
    let mut fields: Vec<&str> = vec![];
    let mut start_line = None;

    for (line_index, line) in text.lines().enumerate() {
        let content = match line.find('!') {
            Some(comment) => &line[..comment],
            None => line,
        };
        let mut rest = content;
        while !rest.is_empty() {
            if start_line.is_none() && !rest.trim().is_empty() {
                start_line = Some(line_index + 1);
            }
            let Some(stop) = rest.find([',', ';']) else {
                push_fragment(&mut fields, rest);
                break;
            };
            push_fragment(&mut fields, &rest[..stop]);
            if rest.as_bytes()[stop] == b',' {
                // a separator always opens a new field, even an empty one
                fields.push("");
            } else {
                statements.push(Statement {
                    line: start_line.take().unwrap_or(line_index + 1),
                    fields: std::mem::take(&mut fields),
                });
            }
            rest = &rest[stop + 1..];
        }
    }

    if let Some(line) = start_line {
        return Err(ParseError::Unterminated {
            object_type: fields.first().map(|s| s.to_string()).unwrap_or_default(),
            line,
        });
    }

    Ok(statements)
}

/// Adds text to the field currently being read. A field may span lines only through
/// surrounding whitespace, so any non-blank fragment replaces an empty placeholder.
fn push_fragment<'a>(fields: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    match fields.last_mut() {
        Some(last) if last.is_empty() => *last = fragment,
        _ if fragment.is_empty() => {}
        _ => fields.push(fragment),
    }
}

const COMMENT_COLUMN: usize = 40;

fn record_to_idf(record: &Record) -> String {
    let values = record.values();
    let last_set = values.iter().rposition(Option::is_some);
    let mut idf = String::new();

    let Some(last_set) = last_set else {
        idf.push_str(record.object_type());
        idf.push_str(";\n");
        return idf;
    };

    idf.push_str(record.object_type());
    idf.push_str(",\n");
    for (index, (value, field)) in values
        .iter()
        .zip(record.schema().fields())
        .take(last_set + 1)
        .enumerate()
    {
        let terminator = if index == last_set { ';' } else { ',' };
        let text = format!(
            "  {}{terminator}",
            value.as_ref().map(|v| v.to_text()).unwrap_or_default()
        );
        idf.push_str(&format!(
            "{text:<width$} !- {}\n",
            field.name(),
            width = COMMENT_COLUMN
        ));
    }
    idf
}
