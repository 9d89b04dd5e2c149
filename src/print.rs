//! Print path: wraps caller-supplied markup into a standalone page and sends it
//! to a print surface.
//!
//! A surface is whatever can show a document and print it, e.g. a browser
//! window or a spooler directory.  Opening one may fail (blocked pop-ups, no
//! printer), which is reported as [`PrintOutcome::SurfaceUnavailable`] rather
//! than as an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use log::{debug, info, warn};

use crate::config::PrintOptions;
use crate::error::PrintError;

/// Inline style sheet of every print page.
pub const PRINT_STYLES: &str = r#"
      body {
        font-family: Arial, sans-serif;
        margin: 20px;
        color: #000;
      }
      .bill-header {
        text-align: center;
        margin-bottom: 30px;
      }
      .bill-title {
        font-size: 24px;
        color: #22C55E;
        font-weight: bold;
      }
      .bill-info {
        display: flex;
        justify-content: space-between;
        margin-bottom: 20px;
      }
      table {
        width: 100%;
        border-collapse: collapse;
        margin-bottom: 20px;
      }
      th, td {
        border: 1px solid #ddd;
        padding: 8px;
        text-align: left;
      }
      th {
        background-color: #f2f2f2;
      }
      .totals {
        text-align: right;
        margin-top: 20px;
      }
      .total-line {
        font-weight: bold;
        font-size: 16px;
      }
      @media print {
        body { margin: 0; }
      }
"#;

/// Builds the standalone print document with `markup` verbatim inside `<body>`.
pub fn print_html(markup: &str, options: &PrintOptions) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <title>{}</title>\n    <style>{}    </style>\n  </head>\n  <body>\n{}\n  </body>\n</html>\n",
        escape_text(&options.title),
        PRINT_STYLES,
        markup
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A document viewer that can print.
pub trait PrintSurface {
    /// Writes the complete document into the surface.
    fn write_document(&mut self, html: &str) -> io::Result<()>;

    /// Ends the document stream.
    fn close_document(&mut self) -> io::Result<()>;

    /// Brings the surface to the foreground.
    fn focus(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Blocks until the document has loaded.
    ///
    /// Returns `false` when the surface has no load signal; the caller then
    /// falls back to a fixed delay.
    fn wait_until_ready(&mut self) -> io::Result<bool> {
        Ok(false)
    }

    /// Dispatches the loaded document to the platform printer.
    fn print(&mut self) -> io::Result<()>;

    /// Closes the surface.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens print surfaces on demand.
pub trait SurfaceProvider {
    /// Surface type handed out by this provider.
    type Surface: PrintSurface;

    /// Opens a new blank surface, or `None` when that is not possible.
    fn open(&mut self) -> Option<Self::Surface>;
}

/// Looks up on-screen markup by element identifier.
pub trait FragmentSource {
    /// Returns the current markup of the element, if it exists.
    fn fragment(&self, element_id: &str) -> Option<String>;
}

/// What a print request ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrintOutcome {
    /// The document was printed and the surface closed.
    Printed,
    /// No surface could be opened; nothing else happened.
    SurfaceUnavailable,
    /// The requested element does not exist; nothing else happened.
    TargetMissing,
}

/// Renders `markup` into a print page and prints it on a freshly opened surface.
pub fn print_fragment<P>(
    provider: &mut P,
    markup: &str,
    options: &PrintOptions,
) -> Result<PrintOutcome, PrintError>
where
    P: SurfaceProvider + ?Sized,
{
    let Some(mut surface) = provider.open() else {
        debug!("No print surface available; skipping print");
        return Ok(PrintOutcome::SurfaceUnavailable);
    };

    // The surface is closed even when an earlier step failed; the first error wins.
    let printed = send_to_surface(&mut surface, markup, options);
    let closed = surface.close();
    printed?;
    closed?;
    Ok(PrintOutcome::Printed)
}

fn send_to_surface<S>(surface: &mut S, markup: &str, options: &PrintOptions) -> io::Result<()>
where
    S: PrintSurface + ?Sized,
{
    let html = print_html(markup, options);
    surface.write_document(&html)?;
    surface.close_document()?;
    surface.focus()?;

    if !surface.wait_until_ready()? {
        let delay = options.ready_fallback_delay();
        debug!("Surface has no ready signal; waiting {:?} before printing", delay);
        thread::sleep(delay);
    }

    surface.print()
}

/// Looks up `element_id` in `source` and prints its markup.
pub fn print_element<S, P>(
    source: &S,
    element_id: &str,
    provider: &mut P,
    options: &PrintOptions,
) -> Result<PrintOutcome, PrintError>
where
    S: FragmentSource + ?Sized,
    P: SurfaceProvider + ?Sized,
{
    match source.fragment(element_id) {
        Some(markup) => print_fragment(provider, &markup, options),
        None => {
            debug!("Element {} not found; skipping print", element_id);
            Ok(PrintOutcome::TargetMissing)
        }
    }
}

/// Provider whose surfaces write print pages into a spool directory.
///
/// Printing is simulated: the page is written to disk and the dispatch is logged.
#[derive(Clone, Debug)]
pub struct HtmlFileSurfaceProvider {
    directory: PathBuf,
    stem: String,
    opened: usize,
}

impl HtmlFileSurfaceProvider {
    /// Creates a provider writing `<stem>-<n>.html` files into `directory`.
    pub fn new(directory: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            stem: stem.into(),
            opened: 0,
        }
    }

    /// Returns the spool directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl SurfaceProvider for HtmlFileSurfaceProvider {
    type Surface = HtmlFileSurface;

    fn open(&mut self) -> Option<HtmlFileSurface> {
        if let Err(err) = fs::create_dir_all(&self.directory) {
            warn!(
                "Cannot open print surface in {}: {}",
                self.directory.display(),
                err
            );
            return None;
        }
        // Pages left by earlier runs in the same directory are never overwritten.
        let path = loop {
            self.opened += 1;
            let candidate = self
                .directory
                .join(format!("{}-{}.html", self.stem, self.opened));
            if !candidate.exists() {
                break candidate;
            }
        };
        Some(HtmlFileSurface::new(path))
    }
}

/// A print surface backed by a single HTML file.
#[derive(Debug)]
pub struct HtmlFileSurface {
    path: PathBuf,
    buffer: String,
    printed: bool,
}

impl HtmlFileSurface {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            buffer: String::new(),
            printed: false,
        }
    }

    /// Returns the file the page is written to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrintSurface for HtmlFileSurface {
    fn write_document(&mut self, html: &str) -> io::Result<()> {
        self.buffer.push_str(html);
        Ok(())
    }

    fn close_document(&mut self) -> io::Result<()> {
        fs::write(&self.path, &self.buffer)
    }

    // The file is complete once `close_document` returns.
    fn wait_until_ready(&mut self) -> io::Result<bool> {
        Ok(true)
    }

    fn print(&mut self) -> io::Result<()> {
        self.printed = true;
        info!("Sent {} to the printer", self.path.display());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if !self.printed {
            warn!("Closing {} without printing", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use super::*;

    #[derive(Default)]
    struct Journal {
        calls: Vec<&'static str>,
        html: String,
    }

    struct RecordingSurface {
        journal: Rc<RefCell<Journal>>,
        ready_signal: bool,
        fail_write: bool,
    }

    impl PrintSurface for RecordingSurface {
        fn write_document(&mut self, html: &str) -> io::Result<()> {
            let mut journal = self.journal.borrow_mut();
            journal.calls.push("write");
            if self.fail_write {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "window went away"));
            }
            journal.html.push_str(html);
            Ok(())
        }

        fn close_document(&mut self) -> io::Result<()> {
            self.journal.borrow_mut().calls.push("close_document");
            Ok(())
        }

        fn focus(&mut self) -> io::Result<()> {
            self.journal.borrow_mut().calls.push("focus");
            Ok(())
        }

        fn wait_until_ready(&mut self) -> io::Result<bool> {
            self.journal.borrow_mut().calls.push("wait");
            Ok(self.ready_signal)
        }

        fn print(&mut self) -> io::Result<()> {
            self.journal.borrow_mut().calls.push("print");
            Ok(())
        }

        fn close(&mut self) -> io::Result<()> {
            self.journal.borrow_mut().calls.push("close");
            Ok(())
        }
    }

    struct RecordingProvider {
        journal: Rc<RefCell<Journal>>,
        available: bool,
        ready_signal: bool,
        fail_write: bool,
    }

    impl RecordingProvider {
        fn new(available: bool) -> Self {
            Self {
                journal: Rc::default(),
                available,
                ready_signal: true,
                fail_write: false,
            }
        }
    }

    impl SurfaceProvider for RecordingProvider {
        type Surface = RecordingSurface;

        fn open(&mut self) -> Option<RecordingSurface> {
            self.available.then(|| RecordingSurface {
                journal: Rc::clone(&self.journal),
                ready_signal: self.ready_signal,
                fail_write: self.fail_write,
            })
        }
    }

    impl FragmentSource for HashMap<String, String> {
        fn fragment(&self, element_id: &str) -> Option<String> {
            self.get(element_id).cloned()
        }
    }

    const FRAGMENT: &str =
        r#"<div class="bill-header"><span class="bill-title">SPOT</span></div><input value="3" checked>"#;

    #[test]
    fn print_page_embeds_markup_verbatim_with_styles() {
        let html = print_html(FRAGMENT, &PrintOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>SPOT Bill</title>"));
        assert!(html.contains(PRINT_STYLES));
        let body_start = html.find("<body>").expect("body open");
        let body_end = html.find("</body>").expect("body close");
        assert!(html[body_start..body_end].contains(FRAGMENT));
    }

    #[test]
    fn title_is_escaped() {
        let options = PrintOptions {
            title: "Fish & <Chips>".to_owned(),
            ..PrintOptions::default()
        };
        assert!(print_html("", &options).contains("<title>Fish &amp; &lt;Chips&gt;</title>"));
    }

    #[test]
    fn prints_in_order_and_closes() {
        let mut provider = RecordingProvider::new(true);
        let outcome = print_fragment(&mut provider, FRAGMENT, &PrintOptions::default())
            .expect("print succeeds");
        assert_eq!(outcome, PrintOutcome::Printed);

        let journal = provider.journal.borrow();
        assert_eq!(
            journal.calls,
            vec!["write", "close_document", "focus", "wait", "print", "close"]
        );
        assert!(journal.html.contains(FRAGMENT));
    }

    #[test]
    fn failed_write_still_closes_the_surface() {
        let mut provider = RecordingProvider::new(true);
        provider.fail_write = true;
        let err = print_fragment(&mut provider, FRAGMENT, &PrintOptions::default()).unwrap_err();
        let PrintError::Surface(source) = err;
        assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(provider.journal.borrow().calls, vec!["write", "close"]);
    }

    #[test]
    fn unavailable_surface_is_a_silent_no_op() {
        let mut provider = RecordingProvider::new(false);
        let outcome = print_fragment(&mut provider, FRAGMENT, &PrintOptions::default())
            .expect("no error when blocked");
        assert_eq!(outcome, PrintOutcome::SurfaceUnavailable);
        assert!(provider.journal.borrow().calls.is_empty());
    }

    #[test]
    fn falls_back_to_fixed_delay_without_ready_signal() {
        let mut provider = RecordingProvider::new(true);
        provider.ready_signal = false;
        let options = PrintOptions {
            ready_fallback_delay_ms: 30,
            ..PrintOptions::default()
        };

        let started = Instant::now();
        let outcome = print_fragment(&mut provider, FRAGMENT, &options).expect("print succeeds");
        assert_eq!(outcome, PrintOutcome::Printed);
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(provider.journal.borrow().calls.contains(&"print"));
    }

    #[test]
    fn missing_element_does_not_open_a_surface() {
        let source: HashMap<String, String> =
            HashMap::from([("bill-preview".to_owned(), FRAGMENT.to_owned())]);
        let mut provider = RecordingProvider::new(true);
        let outcome = print_element(&source, "nope", &mut provider, &PrintOptions::default())
            .expect("no error when missing");
        assert_eq!(outcome, PrintOutcome::TargetMissing);
        assert!(provider.journal.borrow().calls.is_empty());

        let outcome =
            print_element(&source, "bill-preview", &mut provider, &PrintOptions::default())
                .expect("print succeeds");
        assert_eq!(outcome, PrintOutcome::Printed);
    }

    #[test]
    fn html_file_surface_writes_page() {
        let dir = std::env::temp_dir().join(format!("bill_receipt_print_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let mut provider = HtmlFileSurfaceProvider::new(&dir, "bill");
        let outcome = print_fragment(&mut provider, FRAGMENT, &PrintOptions::default())
            .expect("print succeeds");
        assert_eq!(outcome, PrintOutcome::Printed);

        let written = fs::read_to_string(dir.join("bill-1.html")).expect("page written");
        assert!(written.contains(FRAGMENT));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn spooler_keeps_pages_from_earlier_runs() {
        let dir = std::env::temp_dir().join(format!("bill_receipt_spool_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut first_run = HtmlFileSurfaceProvider::new(&dir, "bill");
        print_fragment(&mut first_run, "<p>first</p>", &PrintOptions::default())
            .expect("first print");
        let mut second_run = HtmlFileSurfaceProvider::new(&dir, "bill");
        print_fragment(&mut second_run, "<p>second</p>", &PrintOptions::default())
            .expect("second print");

        let first = fs::read_to_string(dir.join("bill-1.html")).expect("first page kept");
        let second = fs::read_to_string(dir.join("bill-2.html")).expect("second page written");
        assert!(first.contains("<p>first</p>"));
        assert!(second.contains("<p>second</p>"));
        let _ = fs::remove_dir_all(&dir);
    }
}
