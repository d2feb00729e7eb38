//! `#{name}` interpolation used by the build/run command templates.
//!
//! `##` is a literal `#`; a `#` not followed by `{` or `#` is kept as is.

use std::{borrow::Borrow, collections::HashMap, hash::Hash};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined variable '{name}' at column {column}")]
    UndefinedVar { name: String, column: usize },

    #[error("Unclosed '#{{' at column {column}")]
    UnclosedBrace { column: usize },
}

pub fn interp<K, V>(fmt: &str, variables: &HashMap<K, V>) -> Result<String, InterpError>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
{
    let chars: Vec<char> = fmt.chars().collect();
    let mut res = String::with_capacity(fmt.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        match (chars[i], chars.get(i + 1)) {
            ('#', Some('#')) => {
                res.push('#');
                i += 2;
            }
            ('#', Some('{')) => {
                let column = i + 1;
                let Some(len) = chars[i + 2..].iter().position(|&c| c == '}') else {
                    return Err(InterpError::UnclosedBrace { column });
                };
                let name: String = chars[i + 2..i + 2 + len].iter().collect();
                let Some(value) = variables.get(name.as_str()) else {
                    return Err(InterpError::UndefinedVar { name, column });
                };
                res.push_str(value.as_ref());
                i += len + 3;
            }
            (c, _) => {
                res.push(c);
                i += 1;
            }
        }
    }
    Ok(res)
}

/// Quote `s` for a POSIX shell so it stays a single word.
/// ```
/// use cfw_core::str_interp::shell_quote;
///
/// assert_eq!(shell_quote("problems/1850A/main.cpp"), "problems/1850A/main.cpp");
/// assert_eq!(shell_quote("my dir/main.cpp"), "'my dir/main.cpp'");
/// assert_eq!(shell_quote("it's"), r#"'it'\''s'"#);
/// assert_eq!(shell_quote(""), "''");
/// ```
pub fn shell_quote(s: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "-_./,:=+@%".contains(c);
    if !s.is_empty() && s.chars().all(is_safe) {
        return s.to_owned();
    }
    format!("'{}'", s.replace('\'', r#"'\''"#))
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn interp_ok() {
        let vars = hashmap! {
            "sourcePath" => "a/main.cpp",
            "binPath" => "a/build/main",
            "flags" => "-O2 -Wall",
            "empty" => "",
        };

        assert_eq!(interp("g++", &vars).unwrap(), "g++");
        assert_eq!(
            interp("g++ #{flags} -o #{binPath} #{sourcePath}", &vars).unwrap(),
            "g++ -O2 -Wall -o a/build/main a/main.cpp"
        );
        assert_eq!(interp("#{binPath}#{empty}", &vars).unwrap(), "a/build/main");
        assert_eq!(interp("x{flags}", &vars).unwrap(), "x{flags}");
        assert_eq!(interp("# {flags}", &vars).unwrap(), "# {flags}");
        assert_eq!(interp("##{flags}", &vars).unwrap(), "#{flags}");
        assert_eq!(interp("#", &vars).unwrap(), "#");
        assert_eq!(interp("##", &vars).unwrap(), "#");
        assert_eq!(interp("###", &vars).unwrap(), "##");
        assert_eq!(interp("échō #{flags}", &vars).unwrap(), "échō -O2 -Wall");
    }

    #[test]
    fn interp_ng() {
        let vars = hashmap! { "binPath" => "main" };
        assert_eq!(
            interp("run #{bin}", &vars).unwrap_err(),
            InterpError::UndefinedVar {
                name: "bin".to_owned(),
                column: 5
            }
        );
        assert_eq!(
            interp("#{binPath} #{flags", &vars).unwrap_err(),
            InterpError::UnclosedBrace { column: 12 }
        );
    }
}
