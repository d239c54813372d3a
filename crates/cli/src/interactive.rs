//! Line-driven interactive session with a background follow thread

use crate::Error;
use crate::render::{write_header, write_page};
use lognav::{Navigator, Page, SourceId};
use parking_lot::Mutex;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

const HELP: &str = "\
commands:
  tail | head | pgup | pgdn | up | down | refresh
  search <term>     find the next line containing <term>
  next              repeat the last search
  msg <row>         show the full message of a visible row
  file <n>          switch to the n-th configured file
  cap <n>           set rows per page
  progress          show how far into the file the cursor is
  follow on|off     keep the tail page live
  help | quit";

/// A parsed interactive command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Tail,
    Head,
    PageUp,
    PageDown,
    Up,
    Down,
    Refresh,
    Search(String),
    Next,
    Message(usize),
    File(usize),
    Capacity(usize),
    Progress,
    Follow(bool),
    Help,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(c, a)| (c, a.trim()));

        let number = |what: &str| {
            argument
                .parse::<usize>()
                .map_err(|_| format!("{command} expects a {what}, got {argument:?}"))
        };

        match command {
            "tail" => Ok(Self::Tail),
            "head" => Ok(Self::Head),
            "pgup" => Ok(Self::PageUp),
            "pgdn" => Ok(Self::PageDown),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "refresh" | "" => Ok(Self::Refresh),
            "search" if argument.is_empty() => Err("search expects a term".to_string()),
            "search" => Ok(Self::Search(argument.to_string())),
            "next" => Ok(Self::Next),
            "msg" => number("row number").map(Self::Message),
            "file" => match number("file number")? {
                0 => Err("files are numbered from 1".to_string()),
                n => Ok(Self::File(n)),
            },
            "cap" => number("row count").map(Self::Capacity),
            "progress" => Ok(Self::Progress),
            "follow" => match argument {
                "on" => Ok(Self::Follow(true)),
                "off" => Ok(Self::Follow(false)),
                _ => Err("follow expects on or off".to_string()),
            },
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command {other:?}, try help")),
        }
    }
}

/// Navigator plus what is currently on screen
pub struct Screen {
    navigator: Navigator,
    page: Page,
    highlight: Option<usize>,
    last_term: Option<String>,
}

impl Screen {
    pub fn new(navigator: Navigator) -> Self {
        Self {
            navigator,
            page: Page::default(),
            highlight: None,
            last_term: None,
        }
    }

    pub fn apply<W: Write>(&mut self, input: Input, out: &mut W) -> io::Result<()> {
        match input {
            Input::Tail => {
                let page = self.navigator.tail();
                self.show(page, None, out)
            }
            Input::Head => {
                let page = self.navigator.head();
                self.show(page, None, out)
            }
            Input::PageUp => {
                let page = self.navigator.page_up();
                self.show(page, None, out)
            }
            Input::PageDown => {
                let page = self.navigator.page_down();
                self.show(page, None, out)
            }
            Input::Up => {
                let page = self.navigator.up();
                self.show(page, None, out)
            }
            Input::Down => {
                let page = self.navigator.down();
                self.show(page, None, out)
            }
            Input::Refresh => {
                let page = self.navigator.refresh();
                self.show(page, self.highlight, out)
            }
            Input::Search(term) => self.search(term, out),
            Input::Next => match self.last_term.clone() {
                Some(term) => self.search(term, out),
                None => writeln!(out, "nothing searched yet"),
            },
            Input::Message(row) => match row
                .checked_sub(1)
                .and_then(|index| self.navigator.message(&self.page, index))
            {
                Some(message) => writeln!(out, "{message}"),
                None => writeln!(out, "no row {row} on this page"),
            },
            Input::File(number) => {
                if let Err(e) = self.navigator.select(SourceId::new(number - 1)) {
                    return writeln!(out, "{e}");
                }
                self.last_term = None;
                let page = self.navigator.refresh();
                self.show(page, None, out)
            }
            Input::Capacity(capacity) => {
                self.navigator.set_capacity(capacity);
                let page = self.navigator.refresh();
                self.show(page, None, out)
            }
            Input::Progress => writeln!(out, "{}%", self.navigator.progress()),
            Input::Follow(on) => {
                self.navigator.set_following(on);
                if on {
                    let page = self.navigator.tail();
                    self.show(page, None, out)
                } else {
                    writeln!(out, "follow off")
                }
            }
            Input::Help => writeln!(out, "{HELP}"),
            Input::Quit => Ok(()),
        }
    }

    /// Re-tail when the active file is followed; prints nothing otherwise
    pub fn tick<W: Write>(&mut self, out: &mut W) -> io::Result<bool> {
        match self.navigator.tick() {
            Some(page) if page != self.page => {
                self.show(page, None, out)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Repeating a term continues from its previous match
    fn search<W: Write>(&mut self, term: String, out: &mut W) -> io::Result<()> {
        let outcome = self.navigator.search(&term, 0);
        if !outcome.found() {
            writeln!(out, "{term:?} not found")?;
        } else if outcome.wrapped {
            writeln!(out, "search wrapped to the top")?;
        }

        self.last_term = Some(term);
        self.show(outcome.page, outcome.highlight, out)
    }

    fn show<W: Write>(&mut self, page: Page, highlight: Option<usize>, out: &mut W) -> io::Result<()> {
        let widths = self.navigator.column_widths();
        write_header(out, &self.navigator.headers(), &widths)?;
        write_page(out, &page, &widths, highlight)?;

        let source = self.navigator.active();
        writeln!(
            out,
            "-- {} {} {}% {}",
            source.id(),
            source.name(),
            self.navigator.progress(),
            if source.is_following() { "[follow]" } else { "" }
        )?;
        out.flush()?;

        self.page = page;
        self.highlight = highlight;
        Ok(())
    }
}

/// Run the session until `quit` or end of input
pub fn run(navigator: Navigator, poll_interval: Duration) -> Result<(), Error> {
    let screen = Arc::new(Mutex::new(Screen::new(navigator)));
    let shutdown = Arc::new(AtomicBool::new(false));

    screen.lock().apply(Input::Tail, &mut io::stdout().lock())?;

    let follower = spawn_follower(Arc::clone(&screen), poll_interval, Arc::clone(&shutdown));

    for line in io::stdin().lock().lines() {
        let line = line?;
        match Input::parse(&line) {
            Ok(Input::Quit) => break,
            Ok(input) => {
                debug!(?input, "applying command");
                screen.lock().apply(input, &mut io::stdout().lock())?;
            }
            Err(message) => eprintln!("{message}"),
        }
    }

    shutdown.store(true, Ordering::Relaxed);
    follower.join().map_err(|_| Error::FollowerPanicked)??;

    info!("interactive session closed");
    Ok(())
}

fn spawn_follower(
    screen: Arc<Mutex<Screen>>,
    poll_interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        while !shutdown.load(Ordering::Relaxed) {
            thread::sleep(poll_interval);
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            if screen.lock().tick(&mut io::stdout().lock())? {
                debug!("tail page refreshed");
            }
        }
        Ok(())
    })
}
