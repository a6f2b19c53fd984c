//! Terminal stand-in for the editing surface
//!
//! "Opening" a virtual document means rendering it through the content
//! provider, exactly as an editor tab would, and writing it to stdout.

use std::io::Write;

use async_trait::async_trait;
use colored::Colorize;

use crate::common::Result;
use crate::session::{Frontend, ShowOptions};
use crate::vfs::{ContentProvider, DocumentUri};

/// Front-end printing opened documents to stdout
pub struct ConsoleFrontend {
    active: Option<String>,
    provider: ContentProvider,
    print_contents: bool,
    opened: Vec<DocumentUri>,
}

impl ConsoleFrontend {
    pub fn new(active: Option<String>, provider: ContentProvider, print_contents: bool) -> Self {
        Self {
            active,
            provider,
            print_contents,
            opened: Vec::new(),
        }
    }

    /// Documents opened so far, in open order
    pub fn opened(&self) -> &[DocumentUri] {
        &self.opened
    }
}

#[async_trait]
impl Frontend for ConsoleFrontend {
    fn active_document(&self) -> Option<String> {
        self.active.clone()
    }

    async fn open_document(&mut self, uri: &DocumentUri, _options: ShowOptions) -> Result<()> {
        let contents = self.provider.provide_text_document_content(uri)?;

        let mut out = std::io::stdout().lock();
        if self.print_contents {
            writeln!(out, "{}", format!("==> {} <==", uri).bold())?;
            write!(out, "{}", contents)?;
            if !contents.ends_with('\n') {
                writeln!(out)?;
            }
        } else {
            writeln!(out, "{}  ({} lines)", uri, contents.lines().count())?;
        }

        self.opened.push(uri.clone());
        Ok(())
    }
}
