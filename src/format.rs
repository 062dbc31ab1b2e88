//! Named-placeholder string formatting.
//!
//! A small printf dialect over named values:
//!
//! ```text
//! %(name)[flags][width][.precision][type]
//! ```
//!
//! Flags are `-` (left-align), `0` (zero-pad numbers) and `+` (always print the
//! sign). Types are `s` (string, the default when omitted), `d`/`i` (integer),
//! `f` (float) and `j` (JSON). Other printf conversion letters (`x`, `o`, `e`,
//! `c`, ...) are rejected. `%%` is a literal percent sign. A `%` that does not
//! start a directive is copied through unchanged.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(?:(%)|\(([^)]*)\)([-+0]*)(\d+)?(?:\.(\d+))?([b-gijostTuvxX])?)")
        .expect("Failed to compile format directive regex")
});

/// Errors raised while rendering a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown placeholder '{0}'")]
    UnknownField(String),

    #[error("placeholder '{name}' expects a number but found {found}")]
    NotANumber { name: String, found: String },

    #[error("placeholder '{name}' uses unsupported conversion '%{conversion}'")]
    UnsupportedConversion { name: String, conversion: char },
}

/// A source of named values for [`sprintf`].
///
/// `None` means the name is unknown. A known name without a value should
/// return `Some(Value::Null)`, which renders as an empty string.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl Lookup for Map<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Render `template`, substituting every `%(name)` directive from `values`.
pub fn sprintf(template: &str, values: &dyn Lookup) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in DIRECTIVE_PATTERN.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        if caps.get(1).is_some() {
            out.push('%');
            continue;
        }

        let name = caps.get(2).map_or("", |m| m.as_str());
        let value = values
            .lookup(name)
            .ok_or_else(|| FormatError::UnknownField(name.to_string()))?;

        let flags = caps.get(3).map_or("", |m| m.as_str());
        let directive = Directive {
            left_align: flags.contains('-'),
            zero_pad: flags.contains('0'),
            plus_sign: flags.contains('+'),
            width: caps.get(4).and_then(|m| m.as_str().parse().ok()),
            precision: caps.get(5).and_then(|m| m.as_str().parse().ok()),
            conversion: caps
                .get(6)
                .and_then(|m| m.as_str().chars().next())
                .unwrap_or('s'),
        };
        out.push_str(&directive.render(name, &value)?);
    }

    out.push_str(&template[last..]);
    Ok(out)
}

#[derive(Debug)]
struct Directive {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

impl Directive {
    fn render(&self, name: &str, value: &Value) -> Result<String, FormatError> {
        let rendered = match self.conversion {
            'd' | 'i' => {
                let n = as_number(name, value)?.trunc();
                self.pad(self.sign(n), format!("{:.0}", n.abs()), true)
            }
            'f' => {
                let n = as_number(name, value)?;
                let digits = format!("{:.*}", self.precision.unwrap_or(6), n.abs());
                self.pad(self.sign(n), digits, true)
            }
            'j' => self.pad("", value.to_string(), false),
            's' => {
                let text = display(value);
                let text = match self.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                };
                self.pad("", text, false)
            }
            other => {
                return Err(FormatError::UnsupportedConversion {
                    name: name.to_string(),
                    conversion: other,
                })
            }
        };
        Ok(rendered)
    }

    fn sign(&self, n: f64) -> &'static str {
        if n < 0.0 {
            "-"
        } else if self.plus_sign {
            "+"
        } else {
            ""
        }
    }

    fn pad(&self, sign: &str, body: String, numeric: bool) -> String {
        let len = sign.chars().count() + body.chars().count();
        let fill = self.width.unwrap_or(0).saturating_sub(len);

        if self.left_align {
            format!("{sign}{body}{}", " ".repeat(fill))
        } else if self.zero_pad && numeric {
            format!("{sign}{}{body}", "0".repeat(fill))
        } else {
            format!("{}{sign}{body}", " ".repeat(fill))
        }
    }
}

fn as_number(name: &str, value: &Value) -> Result<f64, FormatError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FormatError::NotANumber {
        name: name.to_string(),
        found: value.to_string(),
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
