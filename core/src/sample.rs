//! Extraction of sample testcases from pasted or scraped problem statements.
//!
//! The statement text is free-form. Lines that consist solely of a section word
//! (`Input`, `Output:`, `Examples`, `Sample Input 2`, ...) are markers; the text between
//! an `Input` marker and the next marker is an input block, likewise for `Output`.
//! Marker lines and the `Copy` button artifact never end up inside a block.

use lazy_regex::{lazy_regex, Lazy, Regex};
use serde::{Deserialize, Serialize};

/// One testcase found in a problem statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// 1-based position in document order.
    pub index: usize,
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Input,
    Output,
    Example,
    Copy,
}

/// `input`, `output`, `sample input`, `input 1`, `sample output #2`, ... (already lowercased)
static RE_IO_MARKER: Lazy<Regex> = lazy_regex!(r"^(?:sample\s+)?(input|output)(?:\s*#?\s*[0-9]+)?$");

fn classify(line: &str) -> Option<Marker> {
    let key = line.trim().to_lowercase();
    let key = key.strip_suffix(':').unwrap_or(&key).trim_end();
    match key {
        "copy" => Some(Marker::Copy),
        "example" | "examples" => Some(Marker::Example),
        _ => {
            let caps = RE_IO_MARKER.captures(key)?;
            match &caps[1] {
                "input" => Some(Marker::Input),
                _ => Some(Marker::Output),
            }
        }
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Drop leading and trailing blank lines; everything in between is kept verbatim.
fn trim_block(lines: &[&str]) -> String {
    let Some(first) = lines.iter().position(|l| !is_blank(l)) else {
        return String::new();
    };
    let last = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(first);
    lines[first..=last].join("\n")
}

/// Extract sample input/output pairs from a problem statement.
///
/// The whole text is scanned, and a block ends only at the next marker line or at the end
/// of the text. Pairing is by arrival order: the Nth input block pairs with the Nth output
/// block and surplus blocks of either kind are dropped.
///
/// Besides bare `Input`/`Output`, numbered headers such as `Sample Input 2` or `Output #1`
/// are markers too. A data line that reads exactly `input 3` is therefore taken as a
/// marker, not as block content.
///
/// Never fails: text without markers yields an empty `Vec`.
pub fn extract_samples(statement: &str) -> Vec<Sample> {
    let text = normalize_newlines(statement);
    let lines: Vec<(&str, Option<Marker>)> = text.lines().map(|l| (l, classify(l))).collect();

    let mut inputs: Vec<String> = Vec::new();
    let mut outputs: Vec<String> = Vec::new();
    let mut current: Option<(Marker, Vec<&str>)> = None;

    let mut flush = |block: Option<(Marker, Vec<&str>)>| match block {
        Some((Marker::Input, body)) => inputs.push(trim_block(&body)),
        Some((Marker::Output, body)) => outputs.push(trim_block(&body)),
        _ => (),
    };

    for &(line, marker) in &lines {
        match marker {
            Some(Marker::Copy) => continue,
            Some(m @ (Marker::Input | Marker::Output)) => {
                flush(current.take());
                current = Some((m, Vec::new()));
            }
            Some(Marker::Example) => flush(current.take()),
            _ => {
                if let Some((_, body)) = current.as_mut() {
                    body.push(line);
                }
            }
        }
    }
    flush(current.take());

    inputs
        .into_iter()
        .zip(outputs)
        .enumerate()
        .map(|(i, (input, expected_output))| Sample {
            index: i + 1,
            input,
            expected_output,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(index: usize, input: &str, expected_output: &str) -> Sample {
        Sample {
            index,
            input: input.to_owned(),
            expected_output: expected_output.to_owned(),
        }
    }

    const CODEFORCES_STATEMENT: &str = "\
A. Sum of Two
time limit per test: 1 second

You are given two integers a and b.

Input
The only line contains two integers a and b.

Output
Print a+b.

Examples
Input
Copy
1 2
Output
Copy
3
Input
Copy
3

4 5
Output
Copy
9


Note
In the first example 1+2=3.
";

    const CODEFORCES_EXAMPLES: &str = "\
Examples
Input
Copy
1 2
Output
Copy
3
Input
Copy
3

4 5
Output
Copy
9
";

    #[test]
    fn single_pair() {
        let got = extract_samples("Input\n1 2\nOutput\n3\n");
        assert_eq!(got, vec![sample(1, "1 2", "3")]);
    }

    #[test]
    fn codeforces_examples_section() {
        let got = extract_samples(CODEFORCES_EXAMPLES);
        assert_eq!(got, vec![sample(1, "1 2", "3"), sample(2, "3\n\n4 5", "9")]);
    }

    #[test]
    fn whole_statement_is_scanned() {
        let got = extract_samples(CODEFORCES_STATEMENT);
        assert_eq!(
            got,
            vec![
                sample(1, "The only line contains two integers a and b.", "Print a+b."),
                sample(2, "1 2", "3"),
                sample(3, "3\n\n4 5", "9\n\n\nNote\nIn the first example 1+2=3."),
            ]
        );
    }

    #[test]
    fn pairs_before_examples_header_are_kept() {
        let got = extract_samples("Input\n1\nOutput\n1\nExample\nInput\n2\nOutput\n4\n");
        assert_eq!(got, vec![sample(1, "1", "1"), sample(2, "2", "4")]);
    }

    #[test]
    fn note_line_is_block_content() {
        let got = extract_samples("Examples\nInput\n1\nOutput\nnote\n7\nInput\n2\nOutput\n8\n");
        assert_eq!(got, vec![sample(1, "1", "note\n7"), sample(2, "2", "8")]);
    }

    #[test]
    fn numbered_marker_lookalike_is_a_marker() {
        let got = extract_samples("Input\ninput 3\nOutput\n9\n");
        assert_eq!(got, vec![sample(1, "", "9")]);
    }

    #[test]
    fn empty_or_whitespace_is_empty() {
        assert!(extract_samples("").is_empty());
        assert!(extract_samples("   \n\t\n\n").is_empty());
        assert!(extract_samples("no markers at all\n1 2 3\n").is_empty());
    }

    #[test]
    fn noise_only_is_empty() {
        assert!(extract_samples("Copy\nInput\nOutput\nExamples\nexample\n").is_empty());
    }

    #[test]
    fn copy_line_never_leaks_into_blocks() {
        let got = extract_samples("Input\nCOPY\n5\ncopy\nOutput\n  Copy  \n25\n");
        assert_eq!(got, vec![sample(1, "5", "25")]);
        for s in &got {
            assert!(!s.input.lines().any(|l| l.trim().eq_ignore_ascii_case("copy")));
            assert!(!s
                .expected_output
                .lines()
                .any(|l| l.trim().eq_ignore_ascii_case("copy")));
        }
    }

    #[test]
    fn crlf_and_lf_yield_identical_samples() {
        let lf = "Example\nInput\n2\n1 2\n\nOutput\nYES\nNO\n";
        let crlf = lf.replace('\n', "\r\n");
        assert_eq!(extract_samples(lf), extract_samples(&crlf));
        assert_eq!(extract_samples(&crlf), vec![sample(1, "2\n1 2", "YES\nNO")]);
    }

    #[test]
    fn markers_are_case_insensitive_and_allow_colon() {
        let got = extract_samples("INPUT:\n7\noutput:\n49\nInput :\n8\nOUTPUT\n64\n");
        assert_eq!(got, vec![sample(1, "7", "49"), sample(2, "8", "64")]);
    }

    #[test]
    fn numbered_sample_headers() {
        let text = "Sample Input 1\n3\nSample Output 1\n6\n\nSample Input 2\n4\nSample Output 2\n10\n";
        let got = extract_samples(text);
        assert_eq!(got, vec![sample(1, "3", "6"), sample(2, "4", "10")]);
    }

    #[test]
    fn internal_blank_lines_and_spaces_are_preserved() {
        let text = "Input\n\n\n  a  b\n\n\n\nc \n\n\nOutput\n\nx\n";
        let got = extract_samples(text);
        assert_eq!(got, vec![sample(1, "  a  b\n\n\n\nc ", "x")]);
    }

    #[test]
    fn trailing_input_without_output_is_discarded() {
        let got = extract_samples("Input\n1\nOutput\n1\nInput\n2\n");
        assert_eq!(got, vec![sample(1, "1", "1")]);
    }

    #[test]
    fn irregular_interleaving_pairs_by_arrival_order() {
        let got = extract_samples("Input\na\nInput\nb\nOutput\nA\nOutput\nB\nOutput\nC\n");
        assert_eq!(got, vec![sample(1, "a", "A"), sample(2, "b", "B")]);
    }

    #[test]
    fn indices_strictly_increase() {
        let text = (1..=5)
            .map(|i| format!("Input\n{}\nOutput\n{}\n", i, i * i))
            .collect::<String>();
        let got = extract_samples(&text);
        assert_eq!(got.len(), 5);
        let indices: Vec<usize> = got.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert_eq!(got[4], sample(5, "5", "25"));
    }

    #[test]
    fn note_is_plain_content() {
        let got = extract_samples("Input\nnote\nOutput\nok\n");
        assert_eq!(got, vec![sample(1, "note", "ok")]);
    }

    #[test]
    fn empty_input_block_is_still_a_sample() {
        let got = extract_samples("Input\nOutput\n42\n");
        assert_eq!(got, vec![sample(1, "", "42")]);
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(
            extract_samples(CODEFORCES_STATEMENT),
            extract_samples(CODEFORCES_STATEMENT)
        );
    }

    #[test]
    fn serialized_field_names() {
        let json = serde_json::to_value(sample(1, "1 2", "3")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "index": 1, "input": "1 2", "expectedOutput": "3" })
        );
    }
}
