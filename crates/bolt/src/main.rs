use anyhow::Context;
use bolt_errors::Renderer;
use bolt_parse::{Parse, ParseConfig};
use bolt_tokenizer::{BlockCommentStyle, SyntaxKind, Tokenizer, TokenizerConfig};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
enum Options {
    /// Prints the syntax tree of a file.
    Parse {
        #[command(flatten)]
        input: Input,
        /// Print the tree as an S-expression of rule names.
        #[arg(long)]
        sexp: bool,
    },
    /// Prints the tokens of a file, one per line.
    Tokens {
        #[command(flatten)]
        input: Input,
    },
    /// Reports syntax errors, failing when there are any.
    Check {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    path: Utf8PathBuf,
    /// Let block comments nest.
    #[arg(long)]
    nested_comments: bool,
}

impl Input {
    fn read(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read `{}`", self.path))
    }

    fn config(&self) -> TokenizerConfig {
        let block_comments =
            if self.nested_comments { BlockCommentStyle::Nested } else { BlockCommentStyle::Flat };
        TokenizerConfig { block_comments }
    }
}

fn main() -> anyhow::Result<()> {
    match Options::parse() {
        Options::Parse { input, sexp } => {
            let text = input.read()?;
            let parse =
                bolt_parse::parse_with_config(&text, ParseConfig { tokenizer: input.config() });

            if sexp {
                println!("{}", parse.to_sexp());
            } else {
                print!("{}", parse.debug_tree());
            }
            report(&parse, &input.path);

            Ok(())
        }
        Options::Tokens { input } => {
            let text = input.read()?;
            let mut tokenizer = Tokenizer::with_config(&text, input.config());

            loop {
                let token = tokenizer.next_token();
                let range = token.kind_range;
                println!("{:?}@{range:?} {:?}", token.kind, &text[range]);

                if token.kind == SyntaxKind::EOF {
                    break;
                }
            }

            Ok(())
        }
        Options::Check { input } => {
            let text = input.read()?;
            let parse =
                bolt_parse::parse_with_config(&text, ParseConfig { tokenizer: input.config() });
            let count = report(&parse, &input.path);

            if count > 0 {
                anyhow::bail!("`{}` has {count} syntax error(s)", input.path);
            }

            Ok(())
        }
    }
}

/// Renders the diagnostics of `parse` to stderr, returning how many there were.
fn report(parse: &Parse, path: &Utf8Path) -> usize {
    let renderer = Renderer::styled();
    let text = parse.tree().text();

    for diagnostic in parse.errors() {
        eprintln!("{}", diagnostic.render(&renderer, path.as_str(), text));
    }

    parse.errors().len()
}
