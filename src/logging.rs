use ansi_term::Color::{Blue, Cyan, Green, Red, Yellow};
use log::{Level, Log, Metadata, Record};
use vmatgen_util::time::format_now;

pub struct CommonLogger;

fn colored_level(level: Level) -> ansi_term::Colour {
    match level {
        Level::Error => Red,
        Level::Warn => Yellow,
        Level::Info => Green,
        Level::Debug => Blue,
        Level::Trace => Cyan,
    }
}

impl Log for CommonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let formatted_date = format_now().unwrap_or("unknown".to_string());
        println!(
            "[{}][{:>10}][{:>14}]: {} [{}:{}]",
            Cyan.paint(formatted_date),
            Yellow
                .paint(std::thread::current().name().unwrap_or("main"))
                .to_string(),
            colored_level(record.level())
                .paint(record.level().to_string())
                .to_string(),
            record.args(),
            Green.paint(record.file().unwrap_or("unknown")),
            Green.paint(record.line().unwrap_or(0).to_string())
        );
    }

    fn flush(&self) {}
}
