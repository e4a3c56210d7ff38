use super::consts::{LOG_LINE_PATTERN, LOG_LINE_PATTERN_COLORED};
use log::LevelFilter;
use log4rs::{
    append::{Append, console::ConsoleAppender},
    config::Appender,
    encode::pattern::PatternEncoder,
    filter::{Filter, threshold::ThresholdFilter},
};

pub(super) struct AppenderSpec {
    pub name: &'static str,
    level: Option<LevelFilter>,
    append: Box<dyn Append>,
}

impl AppenderSpec {
    pub fn console(name: &'static str, level: Option<LevelFilter>, colored: bool) -> Self {
        let pattern = if colored { LOG_LINE_PATTERN_COLORED } else { LOG_LINE_PATTERN };
        Self::new(name, level, Box::new(ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(pattern))).build()))
    }

    pub fn new(name: &'static str, level: Option<LevelFilter>, append: Box<dyn Append>) -> Self {
        Self { name, level, append }
    }

    pub fn appender(self) -> Appender {
        Appender::builder()
            .filters(self.level.map(|x| Box::new(ThresholdFilter::new(x)) as Box<dyn Filter>))
            .build(self.name, self.append)
    }
}
