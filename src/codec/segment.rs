//! Segmented URN layout
//!
//! The body of a UPI is an ordered run of `(segment, value)` pairs:
//!
//! ```text
//! urn:reso:upi:<version>:<segment>:<value>:<segment>:<value>:...
//! ```
//!
//! Values are never escaped. A value may hold the separator, and decoding
//! only works because segment names are matched as whole `:<name>:` tokens.
//! A value that itself contains such a token decodes wrongly; strict
//! encoding refuses to produce one.

use crate::codec::{CodecOptions, VersionCodec};
use crate::error::{Result, UpiError};
use crate::record::{property_context, UpiRecord};
use crate::schema::Schema;
use crate::{SEPARATOR, URN_STEM};

/// One `name:value` pair of a URN body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub name: &'a str,
    /// `None` renders as an empty token
    pub value: Option<&'a str>,
}

/// Codec for schemas laid out as alternating segment names and values
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentCodec;

impl SegmentCodec {
    /// `urn:reso:upi:<version>`
    pub fn prefix(version: &str) -> String {
        format!("{}{}{}", URN_STEM, SEPARATOR, version)
    }

    /// Pair each schema segment with the record's value for it
    pub fn segments<'a>(schema: &'a Schema, record: &'a UpiRecord) -> Vec<Segment<'a>> {
        schema
            .mappings()
            .iter()
            .map(|m| Segment {
                name: &m.segment,
                value: record.get(&m.field).filter(|v| !v.is_empty()),
            })
            .collect()
    }

    /// Join the stem, version and segments with the separator
    pub fn render(version: &str, segments: &[Segment<'_>]) -> String {
        let mut out = Self::prefix(version);
        for segment in segments {
            out.push(SEPARATOR);
            out.push_str(segment.name);
            out.push(SEPARATOR);
            out.push_str(segment.value.unwrap_or(""));
        }
        out
    }

    /// Split a URN body (everything after the version) into segments
    ///
    /// Empty values come back as `None`. Whitespace-only values are kept.
    pub fn parse<'a>(schema: &Schema, upi: &str, body: &'a str) -> Result<Vec<Segment<'a>>> {
        let mut segments: Vec<Segment<'a>> = Vec::with_capacity(schema.len());
        let mut last_end = 0;

        for caps in schema.splitter().captures_iter(body) {
            let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let text = &body[last_end..token.start()];
            match segments.last_mut() {
                Some(previous) => previous.value = non_empty(text),
                None if !text.is_empty() => {
                    return Err(UpiError::malformed(
                        upi,
                        format!("unexpected text '{}' before the first segment", text),
                    ));
                }
                None => {}
            }
            segments.push(Segment {
                name: name.as_str(),
                value: None,
            });
            last_end = token.end();
        }

        match segments.last_mut() {
            Some(last) => last.value = non_empty(&body[last_end..]),
            None => return Err(UpiError::malformed(upi, "no segments found")),
        }

        Ok(segments)
    }

    /// Strict-mode check: no value may contain a `:<segment>:` token
    fn check_unambiguous(schema: &Schema, segments: &[Segment<'_>]) -> Result<()> {
        for (mapping, segment) in schema.mappings().iter().zip(segments) {
            let Some(value) = segment.value else {
                continue;
            };
            let wrapped = format!("{}{}{}", SEPARATOR, value, SEPARATOR);
            if let Some(caps) = schema.splitter().captures(&wrapped) {
                return Err(UpiError::AmbiguousValue {
                    field: mapping.field.clone(),
                    value: value.to_string(),
                    segment: caps[1].to_string(),
                });
            }
        }
        Ok(())
    }
}

impl VersionCodec for SegmentCodec {
    fn name(&self) -> &'static str {
        "segmented"
    }

    fn encode(&self, schema: &Schema, record: &UpiRecord, options: &CodecOptions) -> Result<String> {
        let segments = Self::segments(schema, record);
        if options.strict {
            Self::check_unambiguous(schema, &segments)?;
        }
        Ok(Self::render(schema.version().as_str(), &segments))
    }

    fn decode(&self, schema: &Schema, upi: &str) -> Result<UpiRecord> {
        let version = schema.version().as_str();
        if upi.is_empty() {
            return Err(UpiError::malformed(upi, "input is empty"));
        }
        let body = upi
            .strip_prefix(Self::prefix(version).as_str())
            .ok_or_else(|| {
                UpiError::malformed(upi, format!("missing prefix '{}'", Self::prefix(version)))
            })?;

        let segments = Self::parse(schema, upi, body)?;
        if segments.len() != schema.len() {
            return Err(UpiError::malformed(
                upi,
                format!("expected {} segments, found {}", schema.len(), segments.len()),
            ));
        }

        let mut record = UpiRecord::new();
        for (position, (mapping, segment)) in schema.mappings().iter().zip(&segments).enumerate() {
            if mapping.segment != segment.name {
                return Err(UpiError::malformed(
                    upi,
                    format!(
                        "expected segment '{}' at position {}, found '{}'",
                        mapping.segment, position, segment.name
                    ),
                ));
            }
            record.set(mapping.field.as_str(), segment.value.map(String::from));
        }
        record.set_context(property_context(version));

        Ok(record)
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::v2().unwrap()
    }

    #[test]
    fn test_render_empty_record() {
        let schema = schema();
        let record = UpiRecord::new();
        let upi = SegmentCodec::render("2.0", &SegmentCodec::segments(&schema, &record));
        assert_eq!(
            upi,
            "urn:reso:upi:2.0:country::stateorprovince::county::subcounty::propertytype::subpropertytype::parcelnumber::subparcelnumber:"
        );
    }

    #[test]
    fn test_empty_string_renders_like_null() {
        let schema = schema();
        let with_empty = UpiRecord::new().with("Country", Some(""));
        let with_null = UpiRecord::new().with("Country", None);
        let a = SegmentCodec.encode(&schema, &with_empty, &CodecOptions::default()).unwrap();
        let b = SegmentCodec.encode(&schema, &with_null, &CodecOptions::default()).unwrap();
        assert_eq!(a, b);
        assert!(!a.contains("null"));
    }

    #[test]
    fn test_parse_keeps_separators_inside_values() {
        let schema = schema();
        let body = ":country:US:stateorprovince:CA:county:1:2:subcounty::propertytype: :subpropertytype::parcelnumber:a::b:subparcelnumber:";
        let segments = SegmentCodec::parse(&schema, "upi", body).unwrap();
        assert_eq!(segments.len(), 8);
        assert_eq!(segments[2], Segment { name: "county", value: Some("1:2") });
        assert_eq!(segments[3].value, None);
        assert_eq!(segments[4].value, Some(" "));
        assert_eq!(segments[6].value, Some("a::b"));
        assert_eq!(segments[7].value, None);
    }

    #[test]
    fn test_parse_rejects_leading_text() {
        let schema = schema();
        let err = SegmentCodec::parse(&schema, "upi", "1:country:US").unwrap_err();
        assert!(matches!(err, UpiError::MalformedInput { .. }));
    }

    #[test]
    fn test_decode_rejects_missing_segment() {
        let schema = schema();
        let upi = "urn:reso:upi:2.0:country:US:stateorprovince:CA";
        let err = SegmentCodec.decode(&schema, upi).unwrap_err();
        assert!(err.to_string().contains("expected 8 segments, found 2"));
    }

    #[test]
    fn test_decode_rejects_reordered_segments() {
        let schema = schema();
        let upi = "urn:reso:upi:2.0:stateorprovince:CA:country:US:county::subcounty::propertytype::subpropertytype::parcelnumber::subparcelnumber:";
        let err = SegmentCodec.decode(&schema, upi).unwrap_err();
        assert!(err.to_string().contains("expected segment 'country' at position 0"));
    }

    #[test]
    fn test_strict_rejects_segment_token_in_value() {
        let schema = schema();
        let record = UpiRecord::new().with("ParcelNumber", Some("12:county:34"));
        let strict = CodecOptions {
            strict: true,
            ..CodecOptions::default()
        };

        let err = SegmentCodec.encode(&schema, &record, &strict).unwrap_err();
        match err {
            UpiError::AmbiguousValue { field, segment, .. } => {
                assert_eq!(field, "ParcelNumber");
                assert_eq!(segment, "county");
            }
            other => panic!("Expected AmbiguousValue, got {:?}", other),
        }

        // lenient mode encodes it anyway
        assert!(SegmentCodec.encode(&schema, &record, &CodecOptions::default()).is_ok());
    }

    #[test]
    fn test_strict_accepts_plain_separators() {
        let schema = schema();
        let record = UpiRecord::new().with("ParcelNumber", Some(" [abc] 1-2 ::   3:456 "));
        let strict = CodecOptions {
            strict: true,
            ..CodecOptions::default()
        };
        assert!(SegmentCodec.encode(&schema, &record, &strict).is_ok());
    }
}
