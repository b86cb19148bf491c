//! Option registry and the argument scan loop.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::cursor::Cursor;
use crate::error::{ParseError, ParseResult};
use crate::help::{self, HelpConfig, HelpEntry};
use crate::value::{Slot, Value};

const HELP_SHORT: &str = "h";
const HELP_LONG: &str = "help";
const HELP_TEXT: &str = "Show this help message";

enum Binder<'a> {
    Dest(&'a mut dyn Value),
    Help,
}

/// Maps option names to caller-owned destinations and fills them from argv.
///
/// Destinations are borrowed for `'a`, so read them back once the parser
/// has been dropped.
pub struct OptionParser<'a> {
    binders: Vec<Binder<'a>>,
    /// Several names may share one binder index (`-o` / `--output`).
    names: HashMap<String, usize>,
    entries: Vec<HelpEntry>,
    banner: String,
    config: HelpConfig,
    out: Box<dyn Write + 'a>,
    shown_help: bool,
}

impl Default for OptionParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> OptionParser<'a> {
    /// Create an empty registry that prints help to stdout.
    pub fn new() -> Self {
        Self {
            binders: Vec::new(),
            names: HashMap::new(),
            entries: Vec::new(),
            banner: String::new(),
            config: HelpConfig::default(),
            out: Box::new(io::stdout()),
            shown_help: false,
        }
    }

    /// Send help output somewhere other than stdout.
    pub fn with_output(mut self, out: impl Write + 'a) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn with_config(mut self, config: HelpConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &HelpConfig {
        &self.config
    }

    pub fn set_max_column_width(&mut self, width: usize) -> &mut Self {
        self.config.max_column_width = width;
        self
    }

    /// Set the line printed above the option table.
    pub fn set_banner(&mut self, banner: impl Into<String>) -> &mut Self {
        self.banner = banner.into();
        self
    }

    /// Bind every name in the comma-separated `names` to `dest`.
    ///
    /// Single-character names are short options (`-v`), longer ones are long
    /// options (`--verbose`). Leading dashes are accepted and ignored.
    /// Registering a name that is already bound rebinds it; the last
    /// registration wins.
    pub fn register<V>(&mut self, names: &str, dest: &'a mut V, help: &str) -> &mut Self
    where
        V: Value + 'a,
    {
        let index = self.binders.len();
        self.binders.push(Binder::Dest(dest));
        let names = self.bind_names(names, index);
        self.entries.push(HelpEntry {
            names,
            text: help.to_string(),
        });
        self
    }

    /// Whether `-h`/`--help` was triggered by a previous `parse`.
    pub fn has_shown_help(&self) -> bool {
        self.shown_help
    }

    pub fn help_entries(&self) -> &[HelpEntry] {
        &self.entries
    }

    /// Render the help listing as text.
    pub fn render_help(&self) -> String {
        help::render(&self.banner, &self.entries, &self.config)
    }

    /// Write the help listing to the configured output.
    pub fn show_help(&mut self) {
        let text = self.render_help();
        if let Err(err) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
        {
            tracing::warn!(error = %err, "failed to write help output");
        }
    }

    /// Scan `args`, filling registered destinations.
    ///
    /// `args[0]` is the program name and is left alone. On success `args`
    /// holds the program name followed by the positional arguments in their
    /// original order. On error `args` is partially compacted.
    ///
    /// Recognized syntax:
    /// - `--name`: long option; a value, if needed, is the next argument
    /// - `-x`, `-xyz`: short options; the first one that takes a value
    ///   consumes the rest of the token (`-ofile`) or the next argument
    /// - `--`: everything after it is positional
    pub fn parse(&mut self, args: &mut Vec<String>) -> ParseResult<()> {
        self.ensure_help();

        let mut cursor = Cursor::new(args, 1);
        while !cursor.is_exhausted() {
            if cursor.char_at(0) != Some('-') {
                tracing::trace!(argument = cursor.current(), "positional");
                cursor.save_current();
                continue;
            }

            let token = cursor.current().to_string();
            match cursor.char_at(1) {
                None => return Err(ParseError::MalformedArgument(token)),
                Some('-') if token.len() == 2 => {
                    cursor.pop();
                    while !cursor.is_exhausted() {
                        cursor.save_current();
                    }
                    break;
                }
                Some('-') => {
                    cursor.pop();
                    let index = self.lookup(&token[2..], &token)?;
                    self.invoke(index, &mut cursor, &token)?;
                }
                Some(_) => {
                    cursor.advance(1);
                    loop {
                        let Some(short) = cursor.char_at(0) else {
                            break;
                        };
                        let index = self.lookup(short.encode_utf8(&mut [0; 4]), &token)?;
                        cursor.advance(1);
                        self.invoke(index, &mut cursor, &token)?;
                        // Offset 0 means the token is used up.
                        if cursor.offset() == 0 {
                            break;
                        }
                    }
                }
            }
        }

        cursor.finish();
        Ok(())
    }

    fn bind_names(&mut self, names: &str, index: usize) -> Vec<String> {
        let mut bound = Vec::new();
        for name in names.split(',') {
            let name = name.trim().trim_start_matches('-');
            if name.is_empty() {
                continue;
            }
            if self.names.insert(name.to_string(), index).is_some() {
                tracing::debug!(option = name, "option name rebound");
            }
            bound.push(name.to_string());
        }
        bound
    }

    /// Fill in `-h`/`--help` for whichever of the two the caller left free.
    fn ensure_help(&mut self) {
        let missing: Vec<&str> = [HELP_SHORT, HELP_LONG]
            .into_iter()
            .filter(|name| !self.names.contains_key(*name))
            .collect();
        if missing.is_empty() {
            return;
        }

        let index = self.binders.len();
        self.binders.push(Binder::Help);
        let names = self.bind_names(&missing.join(","), index);
        tracing::debug!(?names, "registered built-in help option");
        self.entries.push(HelpEntry {
            names,
            text: HELP_TEXT.to_string(),
        });
    }

    fn lookup(&self, name: &str, token: &str) -> ParseResult<usize> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UnknownOption(token.to_string()))
    }

    fn invoke(&mut self, index: usize, cursor: &mut Cursor<'_>, token: &str) -> ParseResult<()> {
        tracing::trace!(option = token, "matched option");
        match &mut self.binders[index] {
            Binder::Dest(dest) => fill(dest.slot(), cursor, token),
            Binder::Help => {
                self.show_help();
                self.shown_help = true;
                Ok(())
            }
        }
    }
}

fn fill(slot: Slot<'_>, cursor: &mut Cursor<'_>, option: &str) -> ParseResult<()> {
    match slot {
        Slot::Flag(flag) => *flag = true,
        Slot::Text(text) => *text = take_value(cursor, option)?,
        Slot::Convert(dest) => {
            let value = take_value(cursor, option)?;
            dest.convert(&value)
                .map_err(|reason| ParseError::InvalidValue {
                    option: option.to_string(),
                    value,
                    reason,
                })?;
        }
        Slot::List(list) => return fill(list.push_slot(), cursor, option),
    }
    Ok(())
}

/// Consume the rest of the current argument as a value.
fn take_value(cursor: &mut Cursor<'_>, option: &str) -> ParseResult<String> {
    if cursor.is_exhausted() {
        return Err(ParseError::MissingValue(option.to_string()));
    }
    let value = cursor.remainder().to_string();
    cursor.pop();
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("prog")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    fn quiet<'a>() -> OptionParser<'a> {
        OptionParser::new().with_output(io::sink())
    }

    #[test]
    fn positionals_are_left_untouched() {
        let mut args = argv(&["alpha", "beta", "", "gamma"]);
        quiet().parse(&mut args).unwrap();
        assert_eq!(args, argv(&["alpha", "beta", "", "gamma"]));
    }

    #[test]
    fn program_name_is_never_scanned() {
        let mut args = vec!["-not-an-option".to_string(), "file".to_string()];
        quiet().parse(&mut args).unwrap();
        assert_eq!(args, vec!["-not-an-option".to_string(), "file".to_string()]);
    }

    #[test]
    fn options_are_removed_and_positionals_compacted() {
        let mut all = false;
        let mut output = String::new();
        let mut args = argv(&["one", "-a", "two", "-o", "out.txt", "three", "--all"]);
        {
            let mut parser = quiet();
            parser
                .register("a,all", &mut all, "Everything")
                .register("o,output", &mut output, "Output file");
            parser.parse(&mut args).unwrap();
        }
        assert!(all);
        assert_eq!(output, "out.txt");
        assert_eq!(args, argv(&["one", "two", "three"]));
    }

    #[test]
    fn bundled_flags_match_separate_flags() {
        fn run(input: &[&str]) -> (bool, bool, Vec<String>) {
            let (mut a, mut b) = (false, false);
            let mut args = argv(input);
            {
                let mut parser = quiet();
                parser.register("a", &mut a, "").register("b", &mut b, "");
                parser.parse(&mut args).unwrap();
            }
            (a, b, args)
        }

        assert_eq!(run(&["-ab", "x"]), run(&["-a", "-b", "x"]));
        assert_eq!(run(&["-ab"]), (true, true, argv(&[])));
    }

    #[test]
    fn accumulator_appends_each_occurrence() {
        let mut tags: Vec<String> = Vec::new();
        let mut args = argv(&["--tag", "x", "--tag", "y", "file", "--tag", "z"]);
        {
            let mut parser = quiet();
            parser.register("tag", &mut tags, "Add a tag");
            parser.parse(&mut args).unwrap();
        }
        assert_eq!(tags, vec!["x", "y", "z"]);
        assert_eq!(args, argv(&["file"]));
    }

    #[test]
    fn repeated_flag_counts_into_vec() {
        let mut verbose: Vec<bool> = Vec::new();
        let mut args = argv(&["-vvv", "--verbose"]);
        {
            let mut parser = quiet();
            parser.register("v,verbose", &mut verbose, "More output");
            parser.parse(&mut args).unwrap();
        }
        assert_eq!(verbose.len(), 4);
    }

    #[test]
    fn double_dash_ends_option_scanning() {
        // Nothing is registered, so any lookup of `-bar`/`--baz` would fail.
        let mut args = argv(&["foo", "--", "-bar", "--baz", "--"]);
        quiet().parse(&mut args).unwrap();
        assert_eq!(args, argv(&["foo", "-bar", "--baz", "--"]));
    }

    #[test]
    fn short_option_takes_attached_or_next_value() {
        let mut verbose = false;
        let mut output = String::new();
        let mut args = argv(&["-vo", "out.txt", "in.txt"]);
        {
            let mut parser = quiet();
            parser
                .register("v", &mut verbose, "")
                .register("o", &mut output, "");
            parser.parse(&mut args).unwrap();
        }
        assert!(verbose);
        assert_eq!(output, "out.txt");
        assert_eq!(args, argv(&["in.txt"]));

        let mut output = String::new();
        let mut args = argv(&["-oout.txt", "in.txt"]);
        {
            let mut parser = quiet();
            parser.register("o", &mut output, "");
            parser.parse(&mut args).unwrap();
        }
        assert_eq!(output, "out.txt");
        assert_eq!(args, argv(&["in.txt"]));
    }

    #[test]
    fn first_value_option_takes_rest_of_bundle() {
        let mut archive = String::new();
        let mut force = false;
        let mut args = argv(&["-afoo"]);
        {
            let mut parser = quiet();
            parser
                .register("a", &mut archive, "")
                .register("f", &mut force, "");
            parser.parse(&mut args).unwrap();
        }
        assert_eq!(archive, "foo");
        assert!(!force);
    }

    #[test]
    fn long_option_value_is_next_argument_verbatim() {
        let mut output = String::new();
        let mut args = argv(&["--output", "--looks-like-an-option"]);
        {
            let mut parser = quiet();
            parser.register("output", &mut output, "");
            parser.parse(&mut args).unwrap();
        }
        assert_eq!(output, "--looks-like-an-option");
        assert_eq!(args, argv(&[]));
    }

    #[test]
    fn aliases_share_one_destination() {
        let mut output = String::new();
        let mut args = argv(&["-o", "first", "--output", "second"]);
        {
            let mut parser = quiet();
            parser.register("o, --output", &mut output, "");
            parser.parse(&mut args).unwrap();
        }
        assert_eq!(output, "second");
    }

    #[test]
    fn later_registration_wins() {
        let (mut first, mut second) = (false, false);
        let mut args = argv(&["-x"]);
        {
            let mut parser = quiet();
            parser
                .register("x", &mut first, "")
                .register("x", &mut second, "");
            parser.parse(&mut args).unwrap();
        }
        assert!(!first);
        assert!(second);
    }

    #[test]
    fn numeric_values_are_converted() {
        let mut count = 0u32;
        let mut ratio: Option<f64> = None;
        let mut args = argv(&["-n", "12", "--ratio", "0.5"]);
        {
            let mut parser = quiet();
            parser
                .register("n,count", &mut count, "")
                .register("ratio", &mut ratio, "");
            parser.parse(&mut args).unwrap();
        }
        assert_eq!(count, 12);
        assert_eq!(ratio, Some(0.5));
    }

    #[test]
    fn unparsable_value_is_rejected() {
        let mut count = 0u32;
        let mut parser = quiet();
        parser.register("n,count", &mut count, "");
        let err = parser.parse(&mut argv(&["--count", "ten"])).unwrap_err();
        match err {
            ParseError::InvalidValue { option, value, .. } => {
                assert_eq!(option, "--count");
                assert_eq!(value, "ten");
            }
            other => panic!("expected InvalidValue, got: {other:?}"),
        }
    }

    #[test]
    fn lone_dash_is_malformed() {
        let err = quiet().parse(&mut argv(&["file", "-"])).unwrap_err();
        assert_eq!(err, ParseError::MalformedArgument("-".to_string()));
    }

    #[test]
    fn unknown_options_report_the_full_token() {
        let err = quiet().parse(&mut argv(&["--zzz"])).unwrap_err();
        assert_eq!(err, ParseError::UnknownOption("--zzz".to_string()));

        let mut a = false;
        let mut parser = quiet();
        parser.register("a", &mut a, "");
        let err = parser.parse(&mut argv(&["-ax"])).unwrap_err();
        assert_eq!(err, ParseError::UnknownOption("-ax".to_string()));
    }

    #[test]
    fn value_option_at_end_is_missing_value() {
        let mut output = String::new();
        let mut parser = quiet();
        parser.register("o,output", &mut output, "");

        let err = parser.parse(&mut argv(&["in.txt", "--output"])).unwrap_err();
        assert_eq!(err, ParseError::MissingValue("--output".to_string()));

        let err = parser.parse(&mut argv(&["-o"])).unwrap_err();
        assert_eq!(err, ParseError::MissingValue("-o".to_string()));
    }

    #[test]
    fn repeated_option_at_end_is_missing_value() {
        let mut tags: Vec<String> = Vec::new();
        let mut parser = quiet();
        parser.register("t,tag", &mut tags, "");
        let err = parser
            .parse(&mut argv(&["--tag", "a", "--tag"]))
            .unwrap_err();
        assert_eq!(err, ParseError::MissingValue("--tag".to_string()));

        let err = parser.parse(&mut argv(&["file", "-t"])).unwrap_err();
        assert_eq!(err, ParseError::MissingValue("-t".to_string()));
    }

    #[test]
    fn numeric_option_at_end_is_missing_value() {
        let mut count = 0u32;
        let mut parser = quiet();
        parser.register("n,count", &mut count, "");
        let err = parser.parse(&mut argv(&["-n"])).unwrap_err();
        assert_eq!(err, ParseError::MissingValue("-n".to_string()));

        let err = parser.parse(&mut argv(&["--count"])).unwrap_err();
        assert_eq!(err, ParseError::MissingValue("--count".to_string()));
    }

    #[test]
    fn column_width_can_be_narrowed() {
        let mut json = false;
        let mut parser = quiet();
        assert_eq!(parser.config().max_column_width, 40);
        parser
            .set_max_column_width(8)
            .register("j,json", &mut json, "JSON output");
        assert_eq!(parser.config().max_column_width, 8);
        assert_eq!(parser.render_help(), "  -j, --json  JSON output\n");

        let parser = quiet().with_config(HelpConfig {
            max_column_width: 12,
        });
        assert_eq!(parser.config().max_column_width, 12);
    }

    #[test]
    fn help_is_registered_for_both_names() {
        let mut verbose = false;
        let mut out = Vec::new();
        {
            let mut parser = OptionParser::new().with_output(&mut out);
            parser
                .set_banner("Usage: prog [OPTIONS] FILE")
                .register("v,verbose", &mut verbose, "Verbose output");
            let mut args = argv(&["--help", "file"]);
            parser.parse(&mut args).unwrap();
            assert!(parser.has_shown_help());
            assert_eq!(args, argv(&["file"]));

            let last = parser.help_entries().last().unwrap();
            assert_eq!(last.names, vec!["h", "help"]);
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Usage: prog [OPTIONS] FILE\n  -v, --verbose  Verbose output\n  -h, --help     Show this help message\n"
        );
    }

    #[test]
    fn short_help_triggers_rendering() {
        let mut parser = quiet();
        parser.parse(&mut argv(&["-h"])).unwrap();
        assert!(parser.has_shown_help());
    }

    #[test]
    fn user_help_flag_is_not_replaced() {
        let mut custom = false;
        let mut parser = quiet();
        parser.register("help", &mut custom, "Custom help");

        parser.parse(&mut argv(&["--help"])).unwrap();
        assert!(!parser.has_shown_help());

        parser.parse(&mut argv(&["-h"])).unwrap();
        assert!(parser.has_shown_help());

        let names: Vec<Vec<String>> = parser
            .help_entries()
            .iter()
            .map(|e| e.names.clone())
            .collect();
        assert_eq!(names, vec![vec!["help"], vec!["h"]]);
        drop(parser);
        assert!(custom);
    }

    #[test]
    fn help_is_added_once_across_parses() {
        let mut parser = quiet();
        parser.parse(&mut argv(&[])).unwrap();
        parser.parse(&mut argv(&[])).unwrap();
        assert_eq!(parser.help_entries().len(), 1);
    }
}
