//! Encoding and decoding of argument bags.
//!
//! The format is deliberately simple: `key=tag:value` pairs joined by
//! `&`, array elements joined by `;`. Percent-encoding keeps delimiter
//! characters out of decoded content, so a plain split is always safe.

use std::borrow::Cow;

use crossframe_core::{ArgBag, Value};

use crate::error::{WireError, WireResult};

const STRING_TAG: char = 's';
const BOOLEAN_TAG: char = 'b';
const ARRAY_TAG: char = 'a';
const PAIR_DELIM: char = '&';
const ARRAY_DELIM: char = ';';
const TYPE_DELIM: char = ':';
const VALUE_DELIM: char = '=';

/// Encodes a bag into a single delimited string.
///
/// Entries are emitted in key order, so the output is deterministic
/// for a given bag. Booleans are written as the literal `true`/`false`
/// under the `b` tag.
pub fn encode(bag: &ArgBag) -> String {
    let mut out = String::new();
    for (key, value) in bag {
        if !out.is_empty() {
            out.push(PAIR_DELIM);
        }
        out.push_str(&urlencoding::encode(key));
        out.push(VALUE_DELIM);
        match value {
            Value::Str(s) => {
                out.push(STRING_TAG);
                out.push(TYPE_DELIM);
                out.push_str(&urlencoding::encode(s));
            }
            Value::Bool(b) => {
                out.push(BOOLEAN_TAG);
                out.push(TYPE_DELIM);
                out.push_str(if *b { "true" } else { "false" });
            }
            Value::List(items) => {
                out.push(ARRAY_TAG);
                out.push(TYPE_DELIM);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(ARRAY_DELIM);
                    }
                    out.push_str(&urlencoding::encode(item));
                }
            }
        }
    }
    out
}

/// Decodes a delimited string back into a bag.
///
/// Total over any output of [`encode`]; any other input that violates
/// the grammar fails with a [`WireError`] instead of producing a
/// corrupted bag.
///
/// One historical wart is preserved for host compatibility: an empty
/// list encodes to an empty `a:` value, which decodes as a list holding
/// one empty string. Callers that care (the chat surface does)
/// normalize that shape back to an empty list.
pub fn decode(message: &str) -> WireResult<ArgBag> {
    let mut bag = ArgBag::new();
    if message.is_empty() {
        return Ok(bag);
    }
    for pair in message.split(PAIR_DELIM) {
        let (raw_key, raw_value) =
            pair.split_once(VALUE_DELIM)
                .ok_or_else(|| WireError::MissingValueSeparator {
                    pair: pair.to_string(),
                })?;
        let key = percent_decode(raw_key)?.into_owned();
        let (tag, content) =
            raw_value
                .split_once(TYPE_DELIM)
                .ok_or_else(|| WireError::MissingTypeTag {
                    key: key.clone(),
                })?;

        let value = match tag {
            "s" => Value::Str(percent_decode(content)?.into_owned()),
            "b" => Value::Bool(percent_decode(content)? == "true"),
            "a" => {
                let mut items = Vec::new();
                for item in content.split(ARRAY_DELIM) {
                    items.push(percent_decode(item)?.into_owned());
                }
                Value::List(items)
            }
            other => {
                return Err(WireError::UnknownTypeTag {
                    key,
                    tag: other.to_string(),
                });
            }
        };
        bag.set(key, value);
    }
    Ok(bag)
}

fn percent_decode(input: &str) -> WireResult<Cow<'_, str>> {
    urlencoding::decode(input).map_err(|_| WireError::InvalidEncoding {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(bag: &ArgBag) -> ArgBag {
        decode(&encode(bag)).expect("decode of encoded bag")
    }

    #[test]
    fn roundtrip_mixed_bag() {
        let mut bag = ArgBag::new();
        bag.set("foo", "bar");
        bag.set("flag", true);
        bag.set("list", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(roundtrip(&bag), bag);
    }

    #[test]
    fn roundtrip_preserves_type_tags() {
        let mut bag = ArgBag::new();
        bag.set("looksLikeBool", "true");
        bag.set("isBool", true);
        bag.set("isFalse", false);
        let back = roundtrip(&bag);
        assert_eq!(back.get_str("looksLikeBool"), Some("true"));
        assert_eq!(back.get_bool("isBool"), Some(true));
        assert_eq!(back.get_bool("isFalse"), Some(false));
    }

    #[test]
    fn roundtrip_escapes_delimiters() {
        let mut bag = ArgBag::new();
        bag.set("k&e=y", "v:a&l;ue=");
        bag.set(
            "items",
            vec!["a;b".to_string(), "c&d".to_string(), "e=f:g".to_string()],
        );
        let wire = encode(&bag);
        // Raw delimiters only appear as structure, never as content.
        assert_eq!(wire.matches('&').count(), 1);
        assert_eq!(wire.matches(';').count(), 2);
        assert_eq!(roundtrip(&bag), bag);
    }

    #[test]
    fn roundtrip_unicode() {
        let mut bag = ArgBag::new();
        bag.set("label", "Überblick — ответы");
        assert_eq!(roundtrip(&bag), bag);
    }

    #[test]
    fn roundtrip_array_order() {
        let mut bag = ArgBag::new();
        bag.set(
            "tabNames",
            vec!["z".to_string(), "a".to_string(), "m".to_string()],
        );
        let back = roundtrip(&bag);
        assert_eq!(
            back.get_list("tabNames"),
            Some(&["z".to_string(), "a".to_string(), "m".to_string()][..])
        );
    }

    #[test]
    fn encode_is_deterministic() {
        let mut bag = ArgBag::new();
        bag.set("version", "57.0");
        bag.set("activate", true);
        bag.set("id", "scc1");
        bag.set("urls", vec!["/a".to_string(), "/b".to_string()]);
        insta::assert_snapshot!(
            encode(&bag),
            @"activate=b:true&id=s:scc1&urls=a:%2Fa;%2Fb&version=s:57.0"
        );
    }

    #[test]
    fn empty_list_decodes_as_single_empty_string() {
        let mut bag = ArgBag::new();
        bag.set("chatKey", Vec::<String>::new());
        let back = roundtrip(&bag);
        assert_eq!(back.get_list("chatKey"), Some(&[String::new()][..]));
    }

    #[test]
    fn empty_bag_roundtrips_through_empty_string() {
        let bag = ArgBag::new();
        assert_eq!(encode(&bag), "");
        assert_eq!(decode(""), Ok(bag));
    }

    #[test]
    fn decode_missing_value_separator() {
        assert_eq!(
            decode("noseparator"),
            Err(WireError::MissingValueSeparator {
                pair: "noseparator".to_string()
            })
        );
    }

    #[test]
    fn decode_missing_type_tag() {
        assert_eq!(
            decode("key=value"),
            Err(WireError::MissingTypeTag {
                key: "key".to_string()
            })
        );
    }

    #[test]
    fn decode_unknown_type_tag() {
        assert_eq!(
            decode("key=x:value"),
            Err(WireError::UnknownTypeTag {
                key: "key".to_string(),
                tag: "x".to_string()
            })
        );
    }

    #[test]
    fn decode_rejects_garbage_after_valid_pair() {
        let err = decode("a=s:1&garbage").unwrap_err();
        assert!(matches!(err, WireError::MissingValueSeparator { .. }));
    }

    #[test]
    fn boolean_content_other_than_true_is_false() {
        let bag = decode("flag=b:yes").unwrap();
        assert_eq!(bag.get_bool("flag"), Some(false));
    }
}
