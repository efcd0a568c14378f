use crate::loader::LoadReport;
use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().title.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}: {}", icon, label.style(theme().label.clone()), value);
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().failure.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution.clone()));
}

/// Report section title. Printed in quiet mode too, it labels data.
pub fn section(title: &str) {
    println!();
    println!("━ {} ━", title.style(theme().title.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().label.clone()).to_string()
}

pub fn phase(name: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!(
        "{} {}",
        Icons::GEAR.style(theme().phase.clone()),
        name.style(theme().title.clone())
    );
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}

/// One line per committed load batch; dangling names are warned about even in quiet mode
pub fn load_report(report: &LoadReport) {
    if !is_quiet() {
        let counts = format!("{}/{} written", report.written, report.attempted);
        println!(
            "  {} {} {} {}",
            Icons::PACKAGE,
            report.table.style(theme().title.clone()),
            counts,
            dim(&format!("({})", report.policy))
        );
    }
    if !report.dangling.is_empty() {
        warn(&format!(
            "{}: unknown organizations {}",
            report.table,
            report.dangling.join(", ")
        ));
    }
}
