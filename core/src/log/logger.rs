use log::LevelFilter;
use log4rs::config::Logger;
use std::{collections::BTreeMap, str::FromStr};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("Logger spec parsing error: {0}")]
    ParseLoggerSpecError(String),

    #[error("Logger initialisation error: {0}")]
    InitError(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct LoggerSpec {
    pub name: String,
    pub level: LevelFilter,
}

impl LoggerSpec {
    pub fn logger(&self, appenders: &[&'static str]) -> Logger {
        Logger::builder().appenders(appenders.iter().map(|x| x.to_string())).additive(false).build(self.name.clone(), self.level)
    }
}

/// Parsed form of a `RUST_LOG`-style expression such as `info,kastx_wallet_core=debug`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Loggers {
    pub loggers: Vec<LoggerSpec>,
    pub root_level: LevelFilter,
}

impl Loggers {
    /// Parses the expression, ignoring (and reporting) malformed specs rather than failing.
    pub fn parse(expression: &str, default_root: LevelFilter) -> (Self, Vec<LogError>) {
        let mut loggers = BTreeMap::new();
        let mut root_level = None;
        let mut errors = vec![];

        for spec in expression.split(',').map(|x| x.trim()) {
            if spec.is_empty() {
                continue;
            }
            let mut parts = spec.split('=');
            let (level, name) = match (parts.next().map(|x| x.trim()), parts.next().map(|x| x.trim()), parts.next()) {
                (Some(part0), None, None) => {
                    // A lone level string sets the root level, anything else is a module at max level
                    match part0.parse() {
                        Ok(level) => (level, None),
                        Err(_) => (LevelFilter::max(), Some(part0)),
                    }
                }
                (Some(part0), Some(""), None) => (LevelFilter::max(), Some(part0)),
                (Some(part0), Some(part1), None) => match part1.parse() {
                    Ok(level) => (level, Some(part0)),
                    Err(_) => {
                        errors.push(LogError::ParseLoggerSpecError(part1.to_string()));
                        continue;
                    }
                },
                _ => {
                    errors.push(LogError::ParseLoggerSpecError(spec.to_string()));
                    continue;
                }
            };
            match name {
                Some(name) => {
                    loggers.insert(name.to_string(), level);
                }
                None => {
                    root_level.replace(level);
                }
            }
        }

        let loggers = loggers.into_iter().map(|(name, level)| LoggerSpec { name, level }).collect();
        (Self { loggers, root_level: root_level.unwrap_or(default_root) }, errors)
    }
}

impl FromStr for Loggers {
    type Err = LogError;

    /// Strict parsing: the first malformed spec is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (loggers, mut errors) = Self::parse(s, LevelFilter::Error);
        match errors.is_empty() {
            true => Ok(loggers),
            false => Err(errors.swap_remove(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expression() {
        struct Test {
            expression: &'static str,
            root_level: LevelFilter,
            loggers: Vec<(&'static str, LevelFilter)>,
        }

        let tests = vec![
            Test { expression: "", root_level: LevelFilter::Error, loggers: vec![] },
            Test { expression: "info", root_level: LevelFilter::Info, loggers: vec![] },
            Test {
                expression: "info,kastx_wallet_core=debug",
                root_level: LevelFilter::Info,
                loggers: vec![("kastx_wallet_core", LevelFilter::Debug)],
            },
            Test {
                expression: " warn , kastx_txscript = trace, kastx_wallet_core",
                root_level: LevelFilter::Warn,
                loggers: vec![("kastx_txscript", LevelFilter::Trace), ("kastx_wallet_core", LevelFilter::max())],
            },
            Test { expression: "debug,info", root_level: LevelFilter::Info, loggers: vec![] },
        ];

        for test in tests {
            let loggers: Loggers = test.expression.parse().unwrap();
            assert_eq!(loggers.root_level, test.root_level, "{}", test.expression);
            let expected =
                test.loggers.into_iter().map(|(name, level)| LoggerSpec { name: name.to_string(), level }).collect::<Vec<_>>();
            assert_eq!(loggers.loggers, expected, "{}", test.expression);
        }
    }

    #[test]
    fn test_malformed_specs() {
        assert_eq!(
            "info,kastx_core=loud".parse::<Loggers>(),
            Err(LogError::ParseLoggerSpecError("loud".to_string()))
        );

        let (loggers, errors) = Loggers::parse("a=b=c,debug", LevelFilter::Off);
        assert_eq!(errors, vec![LogError::ParseLoggerSpecError("a=b=c".to_string())]);
        assert_eq!(loggers.root_level, LevelFilter::Debug);
        assert!(loggers.loggers.is_empty());
    }
}
