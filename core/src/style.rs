use std::collections::BTreeMap;
use std::time::Duration;

use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::action::{BuildReport, TestReporter};
use crate::sample::Sample;
use crate::testing::{JudgeCode, TestOutcome, Testcase};
use crate::verdict::{Outcome, Verdict};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

const GREEN: Color = Color::TrueColor {
    r: 30,
    g: 180,
    b: 40,
};
const ORANGE: Color = Color::TrueColor {
    r: 210,
    g: 138,
    b: 4,
};
const RED: Color = Color::TrueColor {
    r: 220,
    g: 42,
    b: 42,
};
const PURPLE: Color = Color::TrueColor {
    r: 171,
    g: 40,
    b: 200,
};

impl ColorTheme for JudgeCode {
    fn color(&self) -> Color {
        use JudgeCode::*;
        if !self::is_truecolor_supported() {
            return match self {
                AC => Color::Green,
                WA => Color::Yellow,
                TLE => Color::Red,
                RE => Color::Magenta,
            };
        }
        match self {
            AC => GREEN,
            WA => ORANGE,
            TLE => RED,
            RE => PURPLE,
        }
    }
}

impl ColorTheme for Outcome {
    fn color(&self) -> Color {
        use Outcome::*;
        if !self::is_truecolor_supported() {
            return match self {
                Accepted => Color::Green,
                WrongAnswer => Color::Yellow,
                RuntimeError => Color::Magenta,
                InternalError => Color::Red,
            };
        }
        match self {
            Accepted => GREEN,
            WrongAnswer => ORANGE,
            RuntimeError => PURPLE,
            InternalError => RED,
        }
    }
}

fn badge(label: &str, bg: Color) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", label).on_color(bg).bold().color(fg)
}

pub fn judge_icon(judge: JudgeCode) -> ColoredString {
    badge(&judge.to_string(), judge.color())
}

pub fn outcome_icon(outcome: Outcome) -> ColoredString {
    badge(outcome.abbrev(), outcome.color())
}

pub fn print_verdict(v: &Verdict) {
    let mut line = format!("{} {}", outcome_icon(v.outcome), v.outcome.to_string().bold());
    if v.total_count > 0 {
        line += &format!("  {}/{} passed", v.passed_count, v.total_count);
    }
    let usage: Vec<String> = v
        .runtime_millis
        .map(|ms| format!("{} ms", ms))
        .into_iter()
        .chain(v.memory_kilobytes_as_mb.as_ref().map(|mb| format!("{} MB", mb)))
        .collect();
    if !usage.is_empty() {
        line += &format!("  [{}]", usage.join(", ")).cyan().to_string();
    }
    line += &format!("  @ {}", v.timestamp).dimmed().to_string();
    println!("{}", line);

    if !v.sample_results.is_empty() {
        let samples: Vec<String> = v
            .sample_results
            .iter()
            .map(|r| {
                let mark = if r.passed { "✔".green() } else { "✘".bright_red() };
                format!("#{} {}", r.id, mark)
            })
            .collect();
        println!("  {}", samples.join("  "));
    }
}

pub fn print_samples(samples: &[Sample]) {
    for s in samples {
        println!("{}", format!("Sample #{}", s.index).bright_yellow().bold());
        let cols = terminal_cols();
        for (title, block) in [("[input]", &s.input), ("[output]", &s.expected_output)] {
            print_sub_title(title, cols);
            if block.is_empty() {
                println!("{}", "<EMPTY>".magenta().dimmed());
            } else {
                println!("{}", block);
            }
        }
    }
}

pub fn print_build_failure(build: &BuildReport) {
    println!("{}", " Compile error ".on_red().white().bold());
    print!("{}", build.diagnostics);
}

pub fn print_test_result_summary(results: &[TestOutcome]) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let count: BTreeMap<String, (JudgeCode, usize)> =
        results.iter().fold(BTreeMap::new(), |mut count, r| {
            count.entry(r.judge.to_string()).or_insert((r.judge, 0)).1 += 1;
            count
        });

    let num_total_test = results.len();
    let num_passed = results.iter().filter(|r| r.passed()).count();
    let num_failed = num_total_test - num_passed;

    if num_passed == num_total_test {
        let msg = format!("All {} tests passed ✨", num_total_test);
        print!("{}", msg.green());
    } else {
        let summary_msg = if num_passed > 0 {
            format!("{}/{} tests failed 💣", num_failed, num_total_test)
        } else {
            format!("All {} tests failed 💀", num_total_test)
        };

        let detail_msg = count
            .values()
            .filter(|(judge, _)| *judge != JudgeCode::AC)
            .map(|&(judge, cnt)| {
                format!(
                    "{}{}{}",
                    self::judge_icon(judge),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white(),
                )
            })
            .collect::<Vec<String>>()
            .join(", ");

        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }

    println!(" {}", bar);
}

const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

fn terminal_cols() -> usize {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    cols as usize
}

fn print_sub_title(s: &str, cols: usize) {
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.len() + 1))
            .bright_black(),
    )
}

fn print_lines(entire_str: &str) {
    let lines: Vec<&str> = entire_str.lines().collect();
    if lines.is_empty() {
        println!("{}", "<EMPTY>".magenta().dimmed());
        return;
    }
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();
        print!("{}", trimmed);

        let num_trailing_whitespace = line.len() - trimmed.len();
        if num_trailing_whitespace > 0 {
            print!(
                "{}{}",
                " ".repeat(num_trailing_whitespace).on_red(),
                "(Trailing whitespace)".bright_red().bold()
            );
        }

        let is_last_line = i + 1 == lines.len();
        if is_last_line && !entire_str.ends_with('\n') {
            print!("{}", " Missing new line ".on_yellow().black().bold());
        }

        println!();
    }
}

pub fn print_test_result_detail(res: &TestOutcome) {
    let cols = terminal_cols();
    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    println!(
        "\n{}: {} [{}ms]\n{}",
        res.testcase.name.color(Color::BrightYellow).bold(),
        self::judge_icon(res.judge),
        res.exec.elapsed.as_millis(),
        bold_bar,
    );

    print_sub_title("[expected]", cols);
    print_lines(&res.testcase.expected);

    print_sub_title("[stdout]", cols);
    print_lines(&res.exec.stdout);

    if !res.exec.stderr.is_empty() {
        print_sub_title("[stderr]", cols);
        print!("{}", res.exec.stderr);
    }

    println!("{}", bold_bar);
}

/// Spinner per testcase while [`crate::action::test_all`] runs.
#[derive(Default)]
pub struct SpinnerReporter {
    container: MultiProgress,
    bars: Vec<ProgressBar>,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TestReporter for SpinnerReporter {
    fn on_build_finished(&mut self, build: &BuildReport) {
        if !build.success {
            print_build_failure(build);
        }
    }

    fn on_start(&mut self, testcases: &[Testcase]) {
        let style = ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        for t in testcases {
            let bar = self
                .container
                .add(ProgressBar::new_spinner())
                .with_style(style.clone())
                .with_message(format!("Testcase {} ...", t.name));
            bar.enable_steady_tick(Duration::from_millis(50));
            self.bars.push(bar);
        }
    }

    fn on_testcase_finished(&mut self, res: &TestOutcome) {
        let Some(bar) = res.id.checked_sub(1).and_then(|i| self.bars.get(i)) else {
            return;
        };
        bar.finish_with_message(
            format!(
                "Testcase {} ... {}{} [{}ms]",
                res.testcase.name,
                self::judge_icon(res.judge),
                " ".repeat(3 - res.judge.to_string().len()),
                res.exec.elapsed.as_millis(),
            )
            .cyan()
            .to_string(),
        );
    }

    fn on_finished(&mut self, outcomes: &[TestOutcome]) {
        println!();
        outcomes
            .iter()
            .filter(|x| !x.passed())
            .for_each(print_test_result_detail);
        print_test_result_summary(outcomes);
    }
}
