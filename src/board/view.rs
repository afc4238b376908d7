use std::borrow::Cow;

/// Rows shown before the first "load more".
pub const INITIAL_DISPLAYED: usize = 10;
/// Rows added by each "load more".
pub const PAGE_STEP: usize = 5;

/// Per-view flags derived once from the page URL, plus the pagination
/// cursor for the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_string: Option<String>,
    pub show_search_bar: bool,
    pub show_home_button: bool,
    /// URL offered for copying; ends in `?search=` when the page had no query
    pub full_url: String,
    link_base: String,
    total_displayed: usize,
    page_step: usize,
}

impl ViewState {
    pub fn from_url(current_url: &str) -> Self {
        Self::with_paging(current_url, INITIAL_DISPLAYED, PAGE_STEP)
    }

    /// Derives the view flags from `current_url`.
    ///
    /// A `?` anywhere in the URL turns on the search bar and home button. The
    /// text after the first `=` of the query is percent-decoded and becomes
    /// the initial search term.
    pub fn with_paging(current_url: &str, initial_displayed: usize, page_step: usize) -> Self {
        let Some(query_start) = current_url.find('?') else {
            let full_url = format!("{current_url}?search=");
            return Self {
                search_string: None,
                show_search_bar: false,
                show_home_button: false,
                link_base: full_url.clone(),
                full_url,
                total_displayed: initial_displayed,
                page_step,
            };
        };

        let query = &current_url[query_start + 1..];
        let (search_string, link_base) = match query.find('=') {
            Some(eq) => {
                let value_start = query_start + 1 + eq + 1;
                (
                    Some(decode_component(&current_url[value_start..]))
                        .filter(|s| !s.is_empty()),
                    current_url[..value_start].to_string(),
                )
            }
            None => (None, format!("{}search=", &current_url[..=query_start])),
        };

        Self {
            search_string,
            show_search_bar: true,
            show_home_button: true,
            full_url: current_url.to_string(),
            link_base,
            total_displayed: initial_displayed,
            page_step,
        }
    }

    /// Replaces the search term taken from the URL, e.g. with a CLI flag.
    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            self.search_string = Some(search);
            self.show_search_bar = true;
        }
        self
    }

    pub fn search(&self) -> Option<&str> {
        self.search_string.as_deref()
    }

    pub fn load_more(&mut self) {
        self.total_displayed = self.total_displayed.saturating_add(self.page_step);
    }

    /// The currently visible prefix of `items`.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..items.len().min(self.total_displayed)]
    }

    /// Shareable link for `search`. The term is appended verbatim.
    pub fn share_link(&self, search: &str) -> String {
        format!("{}{search}", self.link_base)
    }
}

// Same contract as JavaScript's decodeURIComponent: `+` stays literal.
fn decode_component(raw: &str) -> String {
    match urlencoding::decode_binary(raw.as_bytes()) {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Cow::Owned(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}
