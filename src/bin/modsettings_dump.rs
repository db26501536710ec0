use anyhow::{Context, Result, bail, format_err};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use modsettings::version_policy::{self, DEFAULT_WRITE_VERSION};
use modsettings::{BinaryVersion, GameVersion, PropertyTree, SettingsFile, SettingsTemplate};

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

enum Action {
    Decode {
        input: PathBuf,
        indent: bool,
        show_version: bool,
    },
    Encode {
        input: PathBuf,
        version: BinaryVersion,
    },
    ExportTemplate {
        input: PathBuf,
        indent: bool,
    },
    ApplyTemplate {
        template: PathBuf,
        input: PathBuf,
    },
    ResolveVersion {
        game_version: GameVersion,
    },
}

struct ModSettingsDump {
    action: Action,
    output_target: Option<PathBuf>,
    confirm_overwrite: bool,
    verbosity_level: Option<LevelFilter>,
}

impl ModSettingsDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let (name, sub) = matches
            .subcommand()
            .ok_or_else(|| format_err!("a subcommand is required"))?;

        // Global arguments are propagated to the subcommand matches.
        let verbosity_level = match sub.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            3 => Some(LevelFilter::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(LevelFilter::Trace)
            }
        };

        let input = |id: &str| -> Result<PathBuf> {
            sub.get_one::<String>(id)
                .map(PathBuf::from)
                .ok_or_else(|| format_err!("missing required argument `{}`", id))
        };

        let action = match name {
            "decode" => Action::Decode {
                input: input("INPUT")?,
                indent: !sub.get_flag("no-indent"),
                show_version: sub.get_flag("show-version"),
            },
            "encode" => {
                let version = match (
                    sub.get_one::<BinaryVersion>("binary-version"),
                    sub.get_one::<GameVersion>("game-version"),
                ) {
                    (Some(version), _) => *version,
                    (None, Some(game_version)) => {
                        version_policy::resolve_write_version(*game_version)
                    }
                    (None, None) => DEFAULT_WRITE_VERSION,
                };

                if !version_policy::is_supported(version) {
                    bail!(
                        "binary version {} is older than the oldest supported version {}",
                        version,
                        version_policy::OLDEST_SUPPORTED_VERSION
                    );
                }

                Action::Encode {
                    input: input("INPUT")?,
                    version,
                }
            }
            "export-template" => Action::ExportTemplate {
                input: input("INPUT")?,
                indent: !sub.get_flag("no-indent"),
            },
            "apply-template" => {
                let template = input("TEMPLATE")?;
                let input = input("INPUT")?;

                let stdin = Path::new("-");
                if template == stdin && input == stdin {
                    bail!("TEMPLATE and INPUT cannot both be read from stdin (`-`)");
                }

                Action::ApplyTemplate { template, input }
            }
            "resolve-version" => Action::ResolveVersion {
                game_version: *sub
                    .get_one::<GameVersion>("GAME_VERSION")
                    .ok_or_else(|| format_err!("missing required argument `GAME_VERSION`"))?,
            },
            other => bail!("unknown subcommand `{}`", other),
        };

        Ok(ModSettingsDump {
            action,
            output_target: sub.get_one::<String>("output-target").map(PathBuf::from),
            confirm_overwrite: !sub.get_flag("no-confirm-overwrite"),
            verbosity_level,
        })
    }

    /// Main entry point for `ModSettingsDump`
    pub fn run(&self) -> Result<()> {
        self.try_to_initialize_logging();

        match &self.action {
            Action::Decode {
                input,
                indent,
                show_version,
            } => {
                let file = Self::read_settings_file(input)?;
                let mut output = self.open_text_output()?;
                if *show_version {
                    writeln!(output, "Binary version {}", file.version())?;
                }
                writeln!(output, "{}", file.to_json_string(*indent)?)?;
                output.flush()?;
            }
            Action::Encode { input, version } => {
                let json = String::from_utf8(read_input(input)?)
                    .with_context(|| format!("{} is not valid UTF-8", input.display()))?;
                let tree = PropertyTree::from_json_str(&json)
                    .with_context(|| format!("{} is not a valid settings tree", input.display()))?;
                self.write_settings_file(&SettingsFile::with_version(*version, tree))?;
            }
            Action::ExportTemplate { input, indent } => {
                let file = Self::read_settings_file(input)?;
                let template = SettingsTemplate::from_settings_tree(file.tree());
                info!("Captured {} settings", template.len());

                let mut output = self.open_text_output()?;
                writeln!(output, "{}", template.to_json_string(*indent)?)?;
                output.flush()?;
            }
            Action::ApplyTemplate { template, input } => {
                let json = String::from_utf8(read_input(template)?)
                    .with_context(|| format!("{} is not valid UTF-8", template.display()))?;
                let template = SettingsTemplate::from_json_str(&json)
                    .with_context(|| format!("{} is not a valid settings template", template.display()))?;

                let mut file = Self::read_settings_file(input)?;
                let applied = template.apply_to_settings_tree(file.tree_mut());
                eprintln!("Applied {} of {} template settings", applied, template.len());

                self.write_settings_file(&file)?;
            }
            Action::ResolveVersion { game_version } => {
                let mut output = self.open_text_output()?;
                writeln!(
                    output,
                    "{}",
                    version_policy::resolve_write_version(*game_version)
                )?;
                output.flush()?;
            }
        }

        Ok(())
    }

    fn read_settings_file(input: &Path) -> Result<SettingsFile> {
        let bytes = read_input(input)?;
        SettingsFile::from_buffer(&bytes)
            .with_context(|| format!("Failed to read settings file {}", input.display()))
    }

    fn open_text_output(&self) -> Result<Box<dyn Write>> {
        match &self.output_target {
            Some(path) => Ok(Box::new(Self::create_output_file(
                path,
                self.confirm_overwrite,
            )?)),
            None => Ok(Box::new(io::stdout())),
        }
    }

    /// Encodes before touching the destination, and removes the destination again if writing
    /// fails midway.
    fn write_settings_file(&self, file: &SettingsFile) -> Result<()> {
        let path = self
            .output_target
            .as_ref()
            .ok_or_else(|| format_err!("binary output requires an output file (`-f`)"))?;

        let bytes = file.to_bytes().context("Failed to encode settings file")?;
        let mut output = Self::create_output_file(path, self.confirm_overwrite)?;

        let written = output.write_all(&bytes).and_then(|_| output.flush());
        if let Err(e) = written {
            drop(output);
            let _ = fs::remove_file(path);
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }

        info!(
            "Wrote {} bytes (binary version {}) to {}",
            bytes.len(),
            file.version(),
            path.display()
        );
        Ok(())
    }

    /// If `prompt` is passed, will display a confirmation prompt before overwriting files.
    fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if p.exists() && prompt {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to override output file at {}",
                    p.display()
                ))
                .default(false)
                .interact()
                .context("Failed to write confirmation prompt to term")?;

            if !confirmed {
                bail!("Cancelled");
            }
        }

        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        File::create(p).with_context(|| format!("Failed to create output file {}", p.display()))
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) = TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                eprintln!("Failed to initialize logging: {}", e);
            }
        }
    }
}

/// Reads the whole input, `-` meaning stdin.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if path == Path::new("-") {
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
    } else {
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut buf))
            .with_context(|| format!("Failed to open file {}", path.display()))?;
    }
    Ok(buf)
}

fn output_arg() -> Arg {
    Arg::new("output-target")
        .long("output")
        .short('f')
        .value_name("OUTPUT")
        .help(
            "Writes output to the file specified instead of stdout, errors will still be printed to stderr. \
             Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`. \
             Will create parent directories if needed.",
        )
}

fn input_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).help(help)
}

fn no_indent_arg() -> Arg {
    Arg::new("no-indent")
        .long("no-indent")
        .action(ArgAction::SetTrue)
        .help("When set, output will not be indented.")
}

fn cli() -> Command {
    Command::new("modsettings_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to read, write and migrate binary mod settings files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace. trace output is only available in debug builds, as it is extremely verbose"),
        )
        .subcommand(
            Command::new("decode")
                .about("Prints the property tree of a binary settings file as JSON")
                .arg(input_arg("INPUT", "Binary settings file, `-` for stdin"))
                .arg(output_arg())
                .arg(no_indent_arg())
                .arg(
                    Arg::new("show-version")
                        .long("show-version")
                        .action(ArgAction::SetTrue)
                        .help("When set, `Binary version <version>` is printed before the tree."),
                ),
        )
        .subcommand(
            Command::new("encode")
                .about("Writes a binary settings file from the JSON form of its property tree")
                .long_about(indoc! {"
                    Writes a binary settings file from the JSON form of its property tree.

                    The binary version written is, in order of precedence:
                        --binary-version  - exactly the version given.
                        --game-version    - the version new files for that game release use.
                        otherwise         - the default write version.
                "})
                .arg(input_arg("INPUT", "JSON property tree, `-` for stdin"))
                .arg(output_arg().required(true))
                .arg(
                    Arg::new("binary-version")
                        .long("binary-version")
                        .value_name("MAJOR.MINOR.BUILD.REVISION")
                        .value_parser(|s: &str| s.parse::<BinaryVersion>())
                        .conflicts_with("game-version")
                        .help("Binary version to write"),
                )
                .arg(
                    Arg::new("game-version")
                        .long("game-version")
                        .value_name("MAJOR.MINOR")
                        .value_parser(|s: &str| s.parse::<GameVersion>())
                        .help("Game release the file is written for"),
                ),
        )
        .subcommand(
            Command::new("export-template")
                .about("Exports the settings stored in a mod-settings file as a settings template")
                .arg(input_arg("INPUT", "Binary mod-settings file, `-` for stdin"))
                .arg(output_arg())
                .arg(no_indent_arg()),
        )
        .subcommand(
            Command::new("apply-template")
                .about("Reapplies a settings template onto a mod-settings file")
                .long_about(indoc! {"
                    Reapplies a settings template onto a mod-settings file.

                    Only settings present in the file are updated, and only when the template
                    value can be read as the type the setting currently has. The file keeps its
                    binary version.
                "})
                .arg(input_arg("TEMPLATE", "Settings template (JSON)"))
                .arg(input_arg("INPUT", "Binary mod-settings file, `-` for stdin"))
                .arg(output_arg().required(true)),
        )
        .subcommand(
            Command::new("resolve-version")
                .about("Prints the binary version new settings files for a game release are written with")
                .arg(
                    Arg::new("GAME_VERSION")
                        .required(true)
                        .value_parser(|s: &str| s.parse::<GameVersion>())
                        .help("Game release, e.g. `0.17`"),
                )
                .arg(output_arg()),
        )
}

fn main() {
    let matches = cli().get_matches();

    let app = match ModSettingsDump::from_cli_matches(&matches) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{:?}", e);
            exit(1)
        }
    };

    if let Err(e) = app.run() {
        eprintln!("{:?}", e);
        exit(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }
}
