//! Display and Debug implementations for Value
//!
//! `Debug` mirrors what `{:?}` prints for the corresponding Rust value, so
//! transcripts read the same as the output of a compiled program.

use std::fmt;

use super::*;

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:?}", item)?;
    }
    Ok(())
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{:?}", c),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{:?}", s.as_str()),

            Value::Vec(items) => {
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }

            Value::Tuple(items) => {
                write!(f, "(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?; // Single-element tuple needs trailing comma
                }
                write!(f, ")")
            }

            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {:?}", k.0, v)?;
                }
                write!(f, "}}")
            }

            Value::Range(range) => {
                if let Some(start) = range.start {
                    write!(f, "{}", start)?;
                }
                write!(f, "{}", if range.inclusive { "..=" } else { ".." })?;
                if let Some(end) = range.end {
                    write!(f, "{}", end)?;
                }
                Ok(())
            }

            Value::Struct(s) => {
                write!(f, "{}", s.type_name)?;
                if s.fields.is_empty() {
                    Ok(())
                } else if s.is_tuple_struct {
                    write!(f, "(")?;
                    for (i, v) in s.fields.values().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{:?}", v)?;
                    }
                    write!(f, ")")
                } else {
                    write!(f, " {{ ")?;
                    for (i, (k, v)) in s.fields.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}: {:?}", k, v)?;
                    }
                    write!(f, " }}")
                }
            }

            Value::Option(opt) => match opt.as_ref() {
                Some(v) => write!(f, "Some({:?})", v),
                None => write!(f, "None"),
            },

            Value::Result(res) => match res.as_ref() {
                Ok(v) => write!(f, "Ok({:?})", v),
                Err(e) => write!(f, "Err({:?})", e),
            },

            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::Closure(_) => write!(f, "<closure>"),
            Value::BuiltinFn(b) => write!(f, "<builtin {}>", b.name),
            Value::Future(fut) => write!(f, "<future {}>", fut.label),
            Value::Type(def) => write!(f, "<struct {}>", def.name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display is more user-friendly, Debug is more detailed
        match self {
            Value::String(s) => f.pad(s.as_str()),
            Value::Char(c) => write!(f, "{}", c),
            Value::Float(n) => write!(f, "{}", n),
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_matches_rust() {
        assert_eq!(format!("{:?}", Value::Float(1.0)), "1.0");
        assert_eq!(format!("{:?}", Value::string("a\"b")), r#""a\"b""#);
        assert_eq!(
            format!("{:?}", Value::tuple(vec![Value::Int(1)])),
            "(1,)"
        );
        assert_eq!(
            format!("{:?}", Value::some(Value::string("x"))),
            r#"Some("x")"#
        );
    }

    #[test]
    fn test_display_strips_quotes() {
        assert_eq!(format!("{}", Value::string("hi")), "hi");
        assert_eq!(format!("{}", Value::Float(2.0)), "2");
        assert_eq!(format!("{}", Value::vec(vec![Value::string("a")])), r#"["a"]"#);
    }

    #[test]
    fn test_struct_debug() {
        let point = StructValue::new("Point")
            .with_field("x", Value::Int(1))
            .with_field("y", Value::Int(2));
        assert_eq!(
            format!("{:?}", Value::structure(point)),
            "Point { x: 1, y: 2 }"
        );
        let meters = StructValue::tuple("Meters").with_field("0", Value::Float(3.5));
        assert_eq!(format!("{:?}", Value::structure(meters)), "Meters(3.5)");
    }
}
