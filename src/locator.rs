//! The graph locator: lists the graphs a source offers and requests loads.

use crate::editor::Command;
use crate::impl_window;
use crate::surface::{Surface, WindowOptions};
use crate::window::{unique_label, WindowCx};
use core::fmt;
use parking_lot::Mutex;
use reqgraph_model::{GraphLocation, GraphSource, ModelError, Submitter};
use std::sync::Arc;
use tracing::{debug, warn};

/// Results of the latest listing. Written from a worker thread.
#[derive(Debug, Default)]
struct Listing {
    graphs: Vec<GraphLocation>,
    error: Option<String>,
    pending: bool,
    /// Bumped by every refresh. Workers of older refreshes don’t write their results.
    generation: u64,
}

/// A closable window listing the graphs at an address, with a load button for each.
///
/// Hidden windows draw nothing. Closing the window hides it from the next frame on.
pub struct LocatorWindow {
    show: bool,
    display: bool,
    address: String,
    listing: Arc<Mutex<Listing>>,
    source: Arc<dyn GraphSource>,
    submitter: Submitter,
    address_label: String,
    refresh_label: String,
}

impl LocatorWindow {
    pub fn new(
        source: Arc<dyn GraphSource>,
        submitter: Submitter,
        address: String,
    ) -> LocatorWindow {
        LocatorWindow {
            show: false,
            display: false,
            address,
            listing: Arc::new(Mutex::new(Listing::default())),
            source,
            submitter,
            address_label: unique_label("##Address"),
            refresh_label: unique_label("Refresh"),
        }
    }

    /// Shows or hides the window. Showing it refreshes the listing.
    pub fn set_show(&mut self, show: bool) {
        self.show = show;
        self.display = show;
        if show {
            if let Err(err) = self.refresh() {
                warn!("couldn't refresh graph listing: {}", err);
            }
        }
    }

    pub fn is_shown(&self) -> bool {
        self.display
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: &str) {
        self.address = address.to_string();
    }

    /// Lists the graphs at the current address on a worker thread.
    pub fn refresh(&mut self) -> Result<(), ModelError> {
        let generation = {
            let mut listing = self.listing.lock();
            listing.graphs.clear();
            listing.error = None;
            listing.pending = true;
            listing.generation += 1;
            listing.generation
        };

        let listing = Arc::clone(&self.listing);
        let source = Arc::clone(&self.source);
        let address = self.address.clone();
        let result = self.submitter.submit(move || {
            let result = source.locate(&address);
            let mut listing = listing.lock();
            if listing.generation != generation {
                debug!("dropping stale listing of {}", address);
                return;
            }
            listing.pending = false;
            match result {
                Ok(graphs) => {
                    debug!("found {} graphs at {}", graphs.len(), address);
                    listing.graphs = graphs;
                }
                Err(err) => {
                    warn!("couldn't list graphs at {}: {}", address, err);
                    listing.error = Some(err.to_string());
                }
            }
        });

        if let Err(err) = &result {
            let mut listing = self.listing.lock();
            if listing.generation != generation {
                return result;
            }
            listing.pending = false;
            listing.error = Some(err.to_string());
        }
        result
    }

    /// The latest listing.
    pub fn graphs(&self) -> Vec<GraphLocation> {
        self.listing.lock().graphs.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.listing.lock().error.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.listing.lock().pending
    }
}

impl fmt::Debug for LocatorWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LocatorWindow")
            .field("show", &self.show)
            .field("display", &self.display)
            .field("address", &self.address)
            .finish()
    }
}

fn load_label(location: &GraphLocation) -> String {
    format!("Load##{}", location.uuid)
}

impl_window! {
    LocatorWindow;

    fn open(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) -> bool {
        if !self.display {
            return false;
        }
        let options = WindowOptions {
            closable: true,
            ..WindowOptions::default()
        };
        self.show = ui.begin_window(cx.label(), options);
        true
    }

    fn body(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        ui.text("Address:");
        ui.same_line();
        ui.input_text(&self.address_label, &mut self.address, false);
        ui.same_line();
        if ui.button(&self.refresh_label) {
            if let Err(err) = self.refresh() {
                warn!("couldn't refresh graph listing: {}", err);
            }
        }

        let (graphs, error, pending) = {
            let listing = self.listing.lock();
            (listing.graphs.clone(), listing.error.clone(), listing.pending)
        };
        if let Some(error) = error {
            ui.text(&error);
        }
        if pending {
            ui.text("Looking for graphs...");
        }
        for location in graphs {
            if ui.button(&load_label(&location)) {
                cx.push(Command::Load(location.clone()));
            }
            ui.same_line();
            ui.text(&location.uuid);
            ui.same_line();
            ui.text(&location.title);
        }
    }

    fn close(&mut self, _cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        ui.end_window();
        self.display = self.show;
    }
}
