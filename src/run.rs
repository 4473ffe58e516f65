//! Command runners: logger init, normalize, parse, config, completions.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Args, Commands, NormalizeArgs, ParseFlags};
use crate::core;
use crate::core::ast::TextOrAst;
use crate::core::config::{Config, ConfigError};
use crate::core::message::Message;
use crate::core::normalize::{NormalizedMessage, Normalizer};
use crate::core::parser::{BasicParser, ParseError, ParseOptions};
use crate::core::translate::AutoTranslateOptions;

/// Errors from running a command.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to read {0}: {1}")]
    Read(String, #[source] io::Error),
    #[error("Invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("--translate needs a language (--language or CHAT_MD_AUTO_TRANSLATE_LANGUAGE)")]
    MissingLanguage,
    #[error("Failed to write output: {0}")]
    Write(#[source] io::Error),
}

/// Initialize env_logger on stderr so stdout stays machine-readable.
pub fn init_logger(args: &Args) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level()),
    )
    .target(env_logger::Target::Stderr)
    .try_init();
}

/// Dispatch the parsed command line.
pub fn run(args: Args) -> Result<(), RunError> {
    match args.command {
        Commands::Normalize(normalize) => {
            let config = core::config::load()?;
            run_normalize(&normalize, &config)
        }
        Commands::Parse {
            text,
            parse,
            pretty,
        } => {
            let config = core::config::load()?;
            run_parse(text.as_deref(), &parse, pretty, &config)
        }
        Commands::Config => {
            let config = core::config::load()?;
            run_config(&config);
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            clap_complete::generate(shell, &mut cmd, core::app::NAME, &mut io::stdout());
            Ok(())
        }
    }
}

/// Messages read from the input and whether they came as one JSON array.
#[derive(Debug, PartialEq)]
pub struct Batch {
    pub messages: Vec<Message>,
    pub array: bool,
}

/// Read one message, an array of messages, or a stream of JSON values.
pub fn read_batch(content: &str) -> Result<Batch, serde_json::Error> {
    let values = serde_json::Deserializer::from_str(content)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()?;
    if let [Value::Array(items)] = values.as_slice() {
        let messages = items
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        return Ok(Batch {
            messages,
            array: true,
        });
    }
    let messages = values
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()?;
    Ok(Batch {
        messages,
        array: false,
    })
}

/// Config parse options with command-line flags applied.
pub fn parse_options(config: &Config, flags: &ParseFlags) -> ParseOptions {
    let mut options = config.parse.clone();
    if flags.emoticons {
        options.emoticons = true;
    }
    if !flags.domains.is_empty() {
        options.custom_domains = flags
            .domains
            .iter()
            .flat_map(|d| core::config::split_list(d))
            .collect();
    }
    options
}

/// Translation options: `--translate` shows every available translation,
/// otherwise the subscription policy from config decides.
pub fn translate_options(
    config: &Config,
    args: &NormalizeArgs,
) -> Result<AutoTranslateOptions, RunError> {
    let mut settings = config.auto_translate.clone();
    if let Some(language) = &args.language {
        settings.language = Some(language.clone());
    }
    if let Some(viewer) = &args.viewer {
        settings.viewer_id = Some(viewer.clone());
    }
    if args.translate {
        let language = settings
            .language
            .filter(|l| !l.is_empty())
            .ok_or(RunError::MissingLanguage)?;
        return Ok(AutoTranslateOptions::always(language));
    }
    Ok(AutoTranslateOptions::from_settings(&settings))
}

fn read_input(input: Option<&Path>) -> Result<String, RunError> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .map_err(|e| RunError::Read(path.display().to_string(), e)),
        _ => io::read_to_string(io::stdin()).map_err(|e| RunError::Read("stdin".to_string(), e)),
    }
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<(), RunError> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut *out, value)
    } else {
        serde_json::to_writer(&mut *out, value)
    };
    written.map_err(|e| RunError::Write(e.into()))?;
    writeln!(out).map_err(RunError::Write)
}

/// Run the `normalize` command: read messages, normalize, print JSON.
pub fn run_normalize(args: &NormalizeArgs, config: &Config) -> Result<(), RunError> {
    let content = read_input(args.input.as_deref())?;
    let batch = read_batch(&content)?;
    log::info!(
        "Normalizing {} message(s) ({})",
        batch.messages.len(),
        if batch.array { "array" } else { "stream" }
    );

    let options = parse_options(config, &args.parse);
    let translate = translate_options(config, args)?;
    log::debug!("Parse options: {:?}; {:?}", options, translate);

    let parser = BasicParser;
    let normalizer = Normalizer::new(&parser, &options);
    let normalized = batch
        .messages
        .iter()
        .map(|message| {
            let id = if message.id.is_empty() { "(no id)" } else { message.id.as_str() };
            log::debug!(
                "Message {}: translated={} e2e={} otr={} cached_md={} nulls={} translatable_attachments={}",
                id,
                translate.show_auto_translate(message),
                message.is_e2ee(),
                message.is_otr(),
                message.md.as_option().is_some(),
                !message.legacy.is_clean(),
                message.attachments().iter().filter(|a| a.is_translated()).count()
            );
            let out = normalizer.normalize(message, &translate)?;
            log::debug!("Message {}: {} block(s)", id, out.md().len());
            Ok(out)
        })
        .collect::<Result<Vec<NormalizedMessage>, ParseError>>()?;

    let mut out = io::stdout().lock();
    if batch.array {
        write_json(&mut out, &normalized, args.pretty)?;
    } else {
        for message in &normalized {
            write_json(&mut out, message, args.pretty)?;
        }
    }
    out.flush().map_err(RunError::Write)
}

/// Run the `parse` command: print the tree for the given text.
pub fn run_parse(
    text: Option<&str>,
    flags: &ParseFlags,
    pretty: bool,
    config: &Config,
) -> Result<(), RunError> {
    let text = match text {
        Some(t) if t != "-" => t.to_string(),
        _ => io::read_to_string(io::stdin()).map_err(|e| RunError::Read("stdin".to_string(), e))?,
    };
    let options = parse_options(config, flags);
    let parser = BasicParser;
    let root = Normalizer::new(&parser, &options).text_to_ast(TextOrAst::Raw(&text))?;
    let mut out = io::stdout().lock();
    write_json(&mut out, &root, pretty)
}

/// Run the `config` command: display config path and resolved settings.
pub fn run_config(config: &Config) {
    let path = core::paths::config_file();
    let path_status = match &path {
        Some(p) if p.exists() => format!("{} (found)", p.display()),
        Some(p) => format!("{} (not found)", p.display()),
        None => "(none)".to_string(),
    };
    let on_off = |b: bool| if b { "on" } else { "off" };
    let or_none = |s: Option<&str>| s.unwrap_or("(none)").to_string();
    let domains = if config.parse.custom_domains.is_empty() {
        "(none)".to_string()
    } else {
        config.parse.custom_domains.join(", ")
    };
    let at = &config.auto_translate;

    println!("{} {}", core::app::NAME, core::app::VERSION);
    println!("Config:         {}", path_status);
    println!("Emoticons:      {}", on_off(config.parse.emoticons));
    println!("Domains:        {}", domains);
    println!(
        "Auto-translate: server {}, subscription {}",
        on_off(at.enabled),
        on_off(at.subscription_auto_translate)
    );
    println!("Language:       {}", or_none(at.language.as_deref()));
    println!("Viewer:         {}", or_none(at.viewer_id.as_deref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_args(language: Option<&str>, translate: bool) -> NormalizeArgs {
        NormalizeArgs {
            input: None,
            language: language.map(str::to_string),
            translate,
            viewer: None,
            parse: ParseFlags {
                emoticons: false,
                domains: Vec::new(),
            },
            pretty: false,
        }
    }

    #[test]
    fn read_batch_single_object() {
        let batch = read_batch(r#"{"_id": "a", "msg": "hi"}"#).unwrap();
        assert!(!batch.array);
        assert_eq!(batch.messages.len(), 1);
        assert_eq!(batch.messages[0].id, "a");
    }

    #[test]
    fn read_batch_array() {
        let batch = read_batch(r#"[{"msg": "a"}, {"msg": "b"}]"#).unwrap();
        assert!(batch.array);
        assert_eq!(batch.messages.len(), 2);
    }

    #[test]
    fn read_batch_json_lines() {
        let batch = read_batch("{\"msg\": \"a\"}\n{\"msg\": \"b\"}\n").unwrap();
        assert!(!batch.array);
        assert_eq!(batch.messages[1].msg, "b");
    }

    #[test]
    fn read_batch_rejects_non_objects() {
        assert!(read_batch("42").is_err());
        assert!(read_batch("{ broken").is_err());
    }

    #[test]
    fn flags_extend_config_parse_options() {
        let config = Config::default();
        let flags = ParseFlags {
            emoticons: true,
            domains: vec!["corp,intra".to_string()],
        };
        let options = parse_options(&config, &flags);
        assert!(options.emoticons);
        assert_eq!(options.custom_domains, vec!["corp".to_string(), "intra".to_string()]);
    }

    #[test]
    fn translate_flag_needs_language() {
        let config = Config::default();
        let err = translate_options(&config, &normalize_args(None, true)).unwrap_err();
        assert!(matches!(err, RunError::MissingLanguage));

        let options = translate_options(&config, &normalize_args(Some("es"), true)).unwrap();
        assert_eq!(options.language(), Some("es"));
        assert!(options.show_auto_translate(&Message::new("x")));
    }

    #[test]
    fn without_translate_flag_settings_decide() {
        let config = Config::default();
        let options = translate_options(&config, &normalize_args(Some("es"), false)).unwrap();
        assert_eq!(options.language(), None);
        assert!(!options.show_auto_translate(&Message::new("x")));
    }
}
