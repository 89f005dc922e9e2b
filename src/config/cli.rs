use crate::config::settings::{MenuKind, SettingDefinition, SettingUpdate};
use crate::config::PluginArgs;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use clap::builder::PossibleValuesParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Args, Command, FromArgMatches};
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(&self.base_path).join(path).is_file()
    }
}

/// Parsed command line: the common flags plus at most one settings change.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub args: PluginArgs,
    pub update: Option<SettingUpdate>,
}

/// Build the clap command for a plugin: the shared flags from
/// [`PluginArgs`] plus one flag per setting that has a menu entry.
pub fn build_command(name: &str, definitions: &[SettingDefinition]) -> Command {
    let mut command = PluginArgs::augment_args(Command::new(name.to_string()));

    for definition in definitions {
        let Some(menu) = &definition.menu else {
            continue;
        };
        let arg = Arg::new(definition.key.clone())
            .long(menu.flag.clone())
            .help(format!("Change the {} setting", strip_quotes(&menu.title)));
        let arg = match menu.kind {
            MenuKind::Toggle => arg.action(ArgAction::SetTrue),
            MenuKind::Choice => {
                let arg = arg.action(ArgAction::Set).value_name("VALUE");
                let names: Option<Vec<String>> = menu
                    .choices
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect();
                match names {
                    Some(names) if !names.is_empty() && definition.default.is_string() => {
                        arg.value_parser(PossibleValuesParser::new(names))
                    }
                    _ => arg,
                }
            }
        };
        command = command.arg(arg);
    }
    command
}

fn strip_quotes(title: &str) -> String {
    title.replace('"', "")
}

pub fn parse_args<I, T>(
    name: &str,
    definitions: &[SettingDefinition],
    args: I,
) -> std::result::Result<CliOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command(name, definitions);
    let matches = command.try_get_matches_from_mut(args)?;
    let args = PluginArgs::from_arg_matches(&matches)?;

    // Only the first requested change is applied
    let mut update = None;
    for definition in definitions {
        let Some(menu) = &definition.menu else {
            continue;
        };
        match menu.kind {
            MenuKind::Toggle => {
                if matches.get_flag(&definition.key) {
                    update = Some(SettingUpdate::Toggle(definition.key.clone()));
                }
            }
            MenuKind::Choice => {
                if let Some(raw) = matches.get_one::<String>(&definition.key) {
                    let value = parse_choice(definition, raw).ok_or_else(|| {
                        command.error(
                            ErrorKind::InvalidValue,
                            format!("invalid value '{}' for '--{}'", raw, menu.flag),
                        )
                    })?;
                    update = Some(SettingUpdate::Set(definition.key.clone(), value));
                }
            }
        }
        if update.is_some() {
            break;
        }
    }

    Ok(CliOptions { args, update })
}

/// Whether `-v`/`--verbose` is among the raw arguments. Checked ahead of
/// [`parse_args`], which needs the setting definitions first.
pub fn verbose_requested(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .take_while(|arg| arg.as_os_str() != "--")
        .any(|arg| arg == "-v" || arg == "--verbose")
}

fn parse_choice(definition: &SettingDefinition, raw: &str) -> Option<Value> {
    definition
        .parse_raw(raw)
        .filter(|value| definition.accepts(value))
}
