//! Configuration loading helpers for `pdnsflex`.
//!
//! Configuration flags may appear anywhere on the command line. They are
//! pulled out for `ortho-config` while the remaining tokens go to the query
//! parser.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig as _;
use pdns_config::Config;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the split-out configuration arguments.
    ///
    /// `args` always starts with the program name.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }

        let mut flag_parts = argument_text.splitn(2, '=');
        let Some(flag) = flag_parts.next() else {
            return FlagAction::Skip;
        };
        let has_inline_value = flag_parts.next().is_some();

        if super::CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value,
            };
        }

        FlagAction::Skip
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) cli_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };

    let mut split = ConfigArgumentSplit {
        config_arguments: vec![program.clone()],
        cli_arguments: vec![program.clone()],
    };
    let mut pending_value = false;
    // Option values for the query parser must not be mistaken for flags,
    // e.g. `--exclude --server` where `--server` is the excluded expression.
    let mut pending_cli_value = false;

    for argument in rest {
        if pending_value {
            split.config_arguments.push(argument.clone());
            pending_value = false;
            continue;
        }
        if pending_cli_value {
            split.cli_arguments.push(argument.clone());
            pending_cli_value = false;
            continue;
        }

        match OrthoConfigLoader::process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value } => {
                split.config_arguments.push(argument.clone());
                pending_value = needs_value;
            }
            FlagAction::Skip => {
                pending_cli_value = takes_separate_value(argument.as_os_str());
                split.cli_arguments.push(argument.clone());
            }
        }
    }

    split
}

fn takes_separate_value(argument: &OsStr) -> bool {
    let text = argument.to_string_lossy();
    if let Some(long) = text.strip_prefix("--") {
        return super::VALUE_LONG_FLAGS.contains(&long);
    }
    // A short value flag given alone, e.g. `-A` followed by its timestamp.
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some('-'), Some(flag), None) if super::VALUE_SHORT_FLAGS.contains(&flag)
    )
}
