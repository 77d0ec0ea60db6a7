#![forbid(unsafe_code)]

//! Panel view model.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::config::SearchConfig;
use crate::loader::IndexStatus;
use crate::session::{ResultState, SearchSession};

/// Inline messages shown above the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Development builds have no index.
    DevelopmentMode,
    IndexFailed,
    Loading,
}

impl Notice {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DevelopmentMode => "Search is only available in production builds",
            Self::IndexFailed => "Search index failed to load",
            Self::Loading => "Loading search index…",
        }
    }
}

/// One row in the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRow {
    /// Payload not resolved yet.
    Loading { id: String },
    Ready {
        id: String,
        url: String,
        title: String,
        /// Rendered as-is; the index output is trusted.
        excerpt_html: String,
    },
}

/// Body of the panel below the notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    Empty,
    NoResults,
    Results(Vec<ResultRow>),
}

/// Everything needed to draw the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub visible: bool,
    /// Full-viewport click catcher, mounted exactly while visible.
    pub scrim: bool,
    pub notices: Vec<Notice>,
    pub body: PanelBody,
}

/// Builds [`PanelView`] values from a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRenderer;

impl ResultRenderer {
    #[must_use]
    pub fn render(session: &SearchSession, config: &SearchConfig) -> PanelView {
        let production = config.mode.is_production();
        let visible = session.is_visible(production);

        let mut notices = Vec::new();
        if !production {
            notices.push(Notice::DevelopmentMode);
        } else if session.status == IndexStatus::Error {
            notices.push(Notice::IndexFailed);
        } else if session.status == IndexStatus::Loading && session.has_query() {
            notices.push(Notice::Loading);
        }

        let rows: Vec<ResultRow> = session
            .results
            .iter()
            .filter_map(|item| match &item.state {
                ResultState::Pending => Some(ResultRow::Loading {
                    id: item.id.clone(),
                }),
                ResultState::Ready(data) => Some(ResultRow::Ready {
                    id: item.id.clone(),
                    url: data.url.clone(),
                    title: data.display_title().to_owned(),
                    excerpt_html: data.excerpt_html.clone(),
                }),
                ResultState::Failed => None,
            })
            .collect();

        let body = if !rows.is_empty() {
            PanelBody::Results(rows)
        } else if production && session.has_query() && session.status == IndexStatus::Ready {
            PanelBody::NoResults
        } else {
            PanelBody::Empty
        };

        PanelView {
            visible,
            scrim: visible,
            notices,
            body,
        }
    }
}

impl PanelView {
    /// Render the panel contents as an HTML fragment.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for notice in &self.notices {
            let _ = write!(
                out,
                r#"<div class="search-notice">{}</div>"#,
                encode_text(notice.message())
            );
        }
        match &self.body {
            PanelBody::Empty => {}
            PanelBody::NoResults => {
                out.push_str(r#"<div class="search-empty">No results found</div>"#);
            }
            PanelBody::Results(rows) => {
                for row in rows {
                    match row {
                        ResultRow::Loading { .. } => {
                            out.push_str(r#"<div class="search-result loading">Loading…</div>"#);
                        }
                        ResultRow::Ready {
                            id,
                            url,
                            title,
                            excerpt_html,
                        } => {
                            let _ = write!(
                                out,
                                r#"<a class="search-result" data-result-id="{}" href="{}"><div class="search-title">{}</div><div class="search-excerpt">{}</div></a>"#,
                                encode_double_quoted_attribute(id),
                                encode_double_quoted_attribute(url),
                                encode_text(title),
                                excerpt_html
                            );
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ResultData;
    use crate::session::ResultItem;
    use folio_core::config::BuildMode;
    use pretty_assertions::assert_eq;

    fn ready_session(query: &str) -> SearchSession {
        SearchSession {
            query: query.into(),
            status: IndexStatus::Ready,
            focused: true,
            ..SearchSession::default()
        }
    }

    #[test]
    fn zero_matches_is_no_results_not_empty() {
        let view = ResultRenderer::render(&ready_session("zzz"), &SearchConfig::default());
        assert!(view.visible);
        assert!(view.scrim);
        assert_eq!(view.body, PanelBody::NoResults);
        assert!(view.notices.is_empty());
    }

    #[test]
    fn pending_items_show_placeholders_and_failed_are_hidden() {
        let mut session = ready_session("rust");
        session.results = vec![
            ResultItem {
                id: "a".into(),
                state: ResultState::Pending,
            },
            ResultItem {
                id: "b".into(),
                state: ResultState::Failed,
            },
            ResultItem {
                id: "c".into(),
                state: ResultState::Ready(ResultData {
                    url: "/c/".into(),
                    title: Some("C".into()),
                    meta_title: None,
                    excerpt_html: "<mark>rust</mark>".into(),
                }),
            },
        ];
        let view = ResultRenderer::render(&session, &SearchConfig::default());
        assert_eq!(
            view.body,
            PanelBody::Results(vec![
                ResultRow::Loading { id: "a".into() },
                ResultRow::Ready {
                    id: "c".into(),
                    url: "/c/".into(),
                    title: "C".into(),
                    excerpt_html: "<mark>rust</mark>".into(),
                },
            ])
        );
        assert!(view.to_html().contains("<mark>rust</mark>"));
    }

    #[test]
    fn development_mode_shows_notice_when_focused() {
        let config = SearchConfig {
            mode: BuildMode::Development,
            ..SearchConfig::default()
        };
        let session = SearchSession {
            focused: true,
            ..SearchSession::default()
        };
        let view = ResultRenderer::render(&session, &config);
        assert!(view.visible);
        assert_eq!(view.notices, vec![Notice::DevelopmentMode]);
        assert_eq!(view.body, PanelBody::Empty);
    }

    #[test]
    fn loading_and_error_notices() {
        let mut session = ready_session("rust");
        session.status = IndexStatus::Loading;
        let view = ResultRenderer::render(&session, &SearchConfig::default());
        assert_eq!(view.notices, vec![Notice::Loading]);
        assert_eq!(view.body, PanelBody::Empty);

        session.status = IndexStatus::Error;
        let view = ResultRenderer::render(&session, &SearchConfig::default());
        assert_eq!(view.notices, vec![Notice::IndexFailed]);
    }
}
