use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};
use unicode_width::UnicodeWidthChar;

use crate::config::{self, Config};
use crate::content::{Content, Index};
use crate::data::{RedditCommentService, RedditFeedService, RedditSubscriptionService};
use crate::listing::{SubredditContent, SubscriptionContent};
use crate::loader::{Indicator, Loader, NullIndicator, SpinnerIndicator};
use crate::record::{Header, Record};
use crate::reddit::{self, CommentSort, StaticToken, TokenProvider};
use crate::submission::SubmissionContent;

/// What to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Subreddit(String),
    Submission(String),
    Subscriptions,
}

impl Default for Target {
    fn default() -> Self {
        Target::Subreddit("front".into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub target: Target,
    /// Number of records to print.
    pub count: usize,
    pub width: Option<usize>,
    pub order: Option<String>,
    pub query: Option<String>,
    pub config_file: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            target: Target::default(),
            count: 10,
            width: None,
            order: None,
            query: None,
            config_file: None,
        }
    }
}

pub fn run(options: Options) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;

    let client = Arc::new(build_client(&cfg).context("create reddit client")?);
    let loader = Arc::new(Loader::new(indicator(), cfg.loader.options()));
    let width = options
        .width
        .or_else(terminal_width)
        .unwrap_or(cfg.content.default_width);
    debug!(view = ?options.target, width, count = options.count, "dumping content");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &options.target {
        Target::Subreddit(name) => {
            let service = Arc::new(RedditFeedService::new(client));
            let mut content = SubredditContent::from_name(
                service,
                name,
                loader,
                options.order.as_deref(),
                options.query.as_deref(),
            )?;
            writeln!(out, "{}", clip(content.name(), width))?;
            dump(&mut content, Index::Item(0), options.count, width, &mut out)?;
        }
        Target::Submission(url) => {
            let mut submission = cfg.content.submission_options();
            submission.order = options
                .order
                .as_deref()
                .map(|value| {
                    CommentSort::parse(value)
                        .ok_or_else(|| anyhow!("unrecognized comment order {value:?}"))
                })
                .transpose()?;
            let service = Arc::new(RedditCommentService::new(client));
            let mut content = SubmissionContent::from_url(service, url, loader, submission)?;
            info!(permalink = content.name(), comments = content.len(), "submission ready");
            dump(&mut content, Index::Header, options.count, width, &mut out)?;
        }
        Target::Subscriptions => {
            let service = Arc::new(RedditSubscriptionService::new(client));
            let mut content = SubscriptionContent::from_user(service, loader)?;
            writeln!(out, "{}", clip(content.name(), width))?;
            dump(&mut content, Index::Item(0), options.count, width, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn build_client(cfg: &Config) -> Result<reddit::Client> {
    let token: Option<Arc<dyn TokenProvider>> = cfg
        .reddit
        .access_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| Arc::new(StaticToken::new(token)) as Arc<dyn TokenProvider>);
    reddit::Client::new(
        token,
        reddit::ClientConfig {
            user_agent: cfg.reddit.user_agent.clone(),
            base_url: cfg.reddit.base_url.clone(),
            http_client: None,
        },
    )
}

fn indicator() -> Arc<dyn Indicator> {
    if io::stderr().is_terminal() {
        Arc::new(SpinnerIndicator::new())
    } else {
        Arc::new(NullIndicator)
    }
}

fn terminal_width() -> Option<usize> {
    if !io::stdout().is_terminal() {
        return None;
    }
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _)| cols as usize)
        .filter(|cols| *cols > 0)
}

/// Prints up to `count` records starting at `start`.
pub fn dump<C, W>(content: &mut C, start: Index, count: usize, width: usize, out: &mut W) -> Result<()>
where
    C: Content,
    W: Write,
{
    for record in content.iterate(start, 1, width).take(count) {
        let record = record?;
        for line in render(&record) {
            writeln!(out, "{}", clip(&line, width))?;
        }
    }
    Ok(())
}

/// Plain-text rows for one record, already indented.
pub fn render(record: &Record) -> Vec<String> {
    match record {
        Record::Header(header) => render_header(header),
        Record::Comment(comment) => {
            let pad = " ".repeat(comment.offset);
            let data = &comment.data;
            let mut meta = format!("{pad}{}", data.author);
            if data.is_author {
                meta.push_str(" [S]");
            }
            if let Some(flair) = &data.flair {
                meta.push_str(&format!(" {flair}"));
            }
            meta.push_str(&format!(" {} pts {}", data.score, data.created));
            if data.gold {
                meta.push_str(" [gold]");
            }
            let mut lines = vec![meta];
            lines.extend(comment.split_body.iter().map(|line| format!("{pad}{line}")));
            lines
        }
        Record::HiddenComment(hidden) => vec![format!(
            "{}[+] {} ({})",
            " ".repeat(hidden.offset),
            hidden.body(),
            hidden.count
        )],
        Record::Continuation(more) => vec![format!(
            "{}[+] {} ({})",
            " ".repeat(more.offset),
            more.body(),
            more.count
        )],
        Record::Subscription(sub) => {
            let mut lines = vec![sub.data.name.clone()];
            lines.extend(sub.split_title.iter().map(|line| format!("  {line}")));
            lines
        }
    }
}

fn render_header(header: &Header) -> Vec<String> {
    let data = &header.data;
    let mut lines = header.split_title.clone();
    let mut meta = format!(
        "{} pts {} {} /r/{} {} comments",
        data.score, data.created, data.author, data.subreddit, data.comments
    );
    if let Some(flair) = &data.flair {
        meta.push_str(&format!(" {flair}"));
    }
    if data.nsfw {
        meta.push_str(" NSFW");
    }
    lines.push(data.url.clone());
    lines.push(meta);
    if !header.split_text.is_empty() {
        lines.push(String::new());
        lines.extend(header.split_text.iter().cloned());
    }
    lines.push(String::new());
    lines
}

/// Cuts `line` to at most `width` terminal columns.
fn clip(line: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::with_capacity(line.len());
    for ch in line.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
