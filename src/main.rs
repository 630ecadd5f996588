use std::process::exit;

fn main() {
    if let Err(e) = featurescope::app::run_cli() {
        let no_color = std::env::args().any(|a| a == "--no-color" || a == "--nc");
        featurescope::app::report_error(&e, no_color);
        exit(1);
    }
}
