use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

pub struct LogColors {}

impl LogColors {
    pub fn success(text: &str) -> String {
        let green = Color::TrueColor {
            r: 4,
            g: 205,
            b: 155,
        };
        text.color(green).to_string()
    }

    pub fn danger(text: &str) -> String {
        let red = Color::TrueColor {
            r: 255,
            g: 56,
            b: 96,
        };
        text.color(red).to_string()
    }

    pub fn info(text: &str) -> String {
        let blue = Color::TrueColor {
            r: 62,
            g: 142,
            b: 208,
        };
        text.color(blue).to_string()
    }
}

pub fn success(message: &str) {
    println!("{}", LogColors::success(message));
}

pub fn danger(message: &str) {
    eprintln!("{}", LogColors::danger(message));
}

pub fn info(message: &str) {
    println!("{}", LogColors::info(message));
}

/// Run a future behind a spinner. The spinner is cleared on every exit
/// path, success or failure.
pub async fn with_spinner<T, F>(message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = fut.await;

    spinner.finish_and_clear();

    result
}
