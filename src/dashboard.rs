//! Dashboard View
//!
//! Server-rendered leaderboard page. Sorting and the mock toggle are carried
//! in the query string, so every header and button is a plain link:
//!
//! ```text
//! GET /?sort=totalWins&dir=desc&mock=true
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Write;

use crate::types::{ApiResponse, ErrorResponse, PeerRecord, RoundInfo};

/// Wins above this count earn the "High Performer" badge
pub const HIGH_PERFORMER_WINS: u64 = 50;

// =============================================================================
// SORTING
// =============================================================================

/// Sortable table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    PeerId,
    WalletAddress,
    TotalWins,
}

impl SortColumn {
    pub const ALL: [SortColumn; 3] = [
        SortColumn::PeerId,
        SortColumn::WalletAddress,
        SortColumn::TotalWins,
    ];

    /// Direction used when the column is first selected
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortColumn::TotalWins => SortDirection::Desc,
            SortColumn::PeerId | SortColumn::WalletAddress => SortDirection::Asc,
        }
    }

    /// Query string value
    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::PeerId => "peerId",
            SortColumn::WalletAddress => "walletAddress",
            SortColumn::TotalWins => "totalWins",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortColumn::PeerId => "Peer ID",
            SortColumn::WalletAddress => "Wallet Address",
            SortColumn::TotalWins => "Total Wins",
        }
    }

    fn compare(self, a: &PeerRecord, b: &PeerRecord) -> Ordering {
        match self {
            SortColumn::PeerId => a.peer_id.cmp(&b.peer_id),
            // Hex case is only a checksum, not part of the value
            SortColumn::WalletAddress => a
                .wallet_address
                .to_ascii_lowercase()
                .cmp(&b.wallet_address.to_ascii_lowercase()),
            SortColumn::TotalWins => a.total_wins.cmp(&b.total_wins),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::TotalWins,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// State after clicking `column`'s header.
    ///
    /// The active column flips direction; any other column is selected with
    /// its default direction.
    pub fn click(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: column.default_direction(),
            }
        }
    }

    /// Stable sort of `peers` in place
    pub fn apply(&self, peers: &mut [PeerRecord]) {
        let column = self.column;
        match self.direction {
            SortDirection::Asc => peers.sort_by(|a, b| column.compare(a, b)),
            SortDirection::Desc => peers.sort_by(|a, b| column.compare(b, a)),
        }
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Shorten an address to `first6...last4`
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Block explorer page for `address`
pub fn explorer_link(explorer_url: &str, address: &str) -> String {
    format!("{}/address/{}", explorer_url.trim_end_matches('/'), address)
}

/// Escape text for HTML element and attribute content
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// PAGE
// =============================================================================

/// Query parameters of the dashboard page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub sort: Option<SortColumn>,
    pub dir: Option<SortDirection>,
    pub mock: Option<bool>,
}

impl DashboardQuery {
    /// Sort state requested by the query, defaults filled in
    pub fn sort_state(&self) -> SortState {
        match (self.sort, self.dir) {
            (Some(column), Some(direction)) => SortState { column, direction },
            (Some(column), None) => SortState {
                column,
                direction: column.default_direction(),
            },
            (None, Some(direction)) => SortState {
                direction,
                ..SortState::default()
            },
            (None, None) => SortState::default(),
        }
    }
}

/// Everything needed to render one page
pub struct PageView<'a> {
    pub result: &'a Result<ApiResponse, ErrorResponse>,
    pub sort: SortState,
    pub use_mock_data: bool,
    pub explorer_url: &'a str,
    pub generated_at: String,
}

fn page_href(sort: SortState, mock: bool) -> String {
    format!(
        "/?sort={}&amp;dir={}&amp;mock={}",
        sort.column.as_str(),
        sort.direction.as_str(),
        mock
    )
}

/// Render the full HTML document
pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(PAGE_HEAD);

    let round_info = match view.result {
        Ok(response) => response.round_info,
        Err(_) => RoundInfo::default(),
    };
    render_round_cards(&mut html, round_info);
    render_toolbar(&mut html, view);

    match view.result {
        Ok(response) => render_table(&mut html, view, response),
        Err(error) => render_error(&mut html, view, error),
    }

    let _ = write!(
        html,
        "<p class=\"footer\">Last update: {}</p>\n</div>\n</main>\n</body>\n</html>\n",
        escape_html(&view.generated_at)
    );
    html
}

fn render_round_cards(html: &mut String, round_info: RoundInfo) {
    let _ = write!(
        html,
        "<div class=\"cards\">\n\
         <div class=\"card round\"><h2>Current Round</h2><span class=\"value\">{}</span><p>Network consensus cycle</p></div>\n\
         <div class=\"card stage\"><h2>Current Stage</h2><span class=\"value\">{}</span><p>Stage within current round</p></div>\n\
         </div>\n",
        round_info.current_round, round_info.current_stage
    );
}

fn render_toolbar(html: &mut String, view: &PageView<'_>) {
    html.push_str("<div class=\"toolbar\">\n<div>");
    if view.use_mock_data {
        html.push_str("<span class=\"badge mock\">Using mock data</span>");
    }
    let label = if view.use_mock_data {
        "Use Real Data"
    } else {
        "Use Mock Data"
    };
    let _ = write!(
        html,
        "</div>\n<a class=\"button\" href=\"{}\">{}</a>\n</div>\n",
        page_href(view.sort, !view.use_mock_data),
        label
    );
}

fn render_table(html: &mut String, view: &PageView<'_>, response: &ApiResponse) {
    let mut peers = response.peers.clone();
    view.sort.apply(&mut peers);

    html.push_str(
        "<div class=\"table-header\"><h2>Peer Wins Leaderboard</h2>\
         <p class=\"hint\">Click column headers to sort</p></div>\n\
         <table>\n<thead><tr>",
    );
    for column in SortColumn::ALL {
        let indicator = if view.sort.column == column {
            view.sort.direction.arrow()
        } else {
            ""
        };
        let _ = write!(
            html,
            "<th><a href=\"{}\">{} {}</a></th>",
            page_href(view.sort.click(column), view.use_mock_data),
            column.label(),
            indicator
        );
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (index, peer) in peers.iter().enumerate() {
        let badge = if peer.total_wins > HIGH_PERFORMER_WINS {
            "<span class=\"badge high\">High Performer</span>"
        } else {
            ""
        };
        let _ = write!(
            html,
            "<tr><td><span class=\"rank\">{}</span> <span class=\"peer\">{}</span></td>\
             <td><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></td>\
             <td><span class=\"wins\">{}</span>{}</td></tr>\n",
            index + 1,
            escape_html(&peer.peer_id),
            escape_html(&explorer_link(view.explorer_url, &peer.wallet_address)),
            escape_html(&truncate_address(&peer.wallet_address)),
            peer.total_wins,
            badge
        );
    }

    if peers.is_empty() {
        html.push_str(
            "<tr><td colspan=\"3\" class=\"empty\"><p>No peer data available</p>\
             <p class=\"hint\">Try adding some peer IDs to your configuration</p></td></tr>\n",
        );
    }
    html.push_str("</tbody>\n</table>\n");
}

fn render_error(html: &mut String, view: &PageView<'_>, error: &ErrorResponse) {
    let _ = write!(
        html,
        "<div class=\"error\" role=\"alert\">\n<h3>Error Encountered</h3>\n<p>{}</p>\n",
        escape_html(&error.error)
    );

    if let Some(details) = &error.details {
        let _ = write!(
            html,
            "<div class=\"details\"><strong>Technical Details:</strong> <code>{}</code></div>\n",
            escape_html(details)
        );
    }

    if let Some(suggestion) = &error.suggestion {
        let _ = write!(
            html,
            "<div class=\"suggestion\"><strong>Suggestion:</strong><p>{}</p>",
            escape_html(suggestion)
        );
        if suggestion.contains("USE_MOCK_DATA") {
            let _ = write!(
                html,
                "<a class=\"button small\" href=\"{}\">Use Mock Data Instead</a>",
                page_href(view.sort, true)
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
}

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Network Dashboard</title>
<style>
  body { margin: 0; font-family: system-ui, sans-serif; background: #f3f4f6; color: #111827; }
  main { padding: 2rem; }
  .panel { max-width: 64rem; margin: 0 auto; background: #fff; border: 1px solid #e5e7eb; border-radius: 0.5rem; padding: 1.5rem; box-shadow: 0 4px 12px rgba(0,0,0,0.06); }
  h1 { text-align: center; color: #2563eb; margin-bottom: 0.25rem; }
  .subtitle { text-align: center; color: #6b7280; margin-top: 0; }
  .cards { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; margin: 1.5rem 0; }
  .card { padding: 1rem; border-radius: 0.5rem; }
  .card h2 { font-size: 1.1rem; margin: 0 0 0.5rem; }
  .card .value { font-size: 2rem; font-weight: 700; }
  .card p { color: #4b5563; font-size: 0.85rem; }
  .round { background: #eff6ff; border: 1px solid #bfdbfe; }
  .stage { background: #f0fdf4; border: 1px solid #bbf7d0; }
  .toolbar, .table-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 1rem; }
  .button { background: #2563eb; color: #fff; padding: 0.5rem 1rem; border-radius: 0.5rem; text-decoration: none; font-weight: 600; font-size: 0.875rem; }
  .button.small { display: inline-block; margin-top: 0.5rem; background: #ca8a04; padding: 0.25rem 0.75rem; }
  .badge { padding: 0.25rem 0.75rem; border-radius: 9999px; font-size: 0.8rem; font-weight: 500; }
  .badge.mock, .badge.high { background: #fef9c3; color: #854d0e; margin-left: 0.5rem; }
  .hint { color: #6b7280; font-size: 0.85rem; font-style: italic; }
  table { width: 100%; border-collapse: collapse; }
  th { text-align: left; font-size: 0.75rem; text-transform: uppercase; background: #eff6ff; padding: 1rem 1.5rem; }
  th a { color: #1d4ed8; text-decoration: none; }
  td { padding: 1rem 1.5rem; border-top: 1px solid #e5e7eb; white-space: nowrap; }
  tr:nth-child(even) td { background: #f9fafb; }
  td a { color: #2563eb; }
  .rank { display: inline-block; width: 2rem; height: 2rem; line-height: 2rem; text-align: center; border-radius: 9999px; background: #dbeafe; color: #1d4ed8; }
  .wins { background: #dcfce7; color: #166534; padding: 0.25rem 0.75rem; border-radius: 9999px; font-weight: 600; }
  .empty { text-align: center; color: #6b7280; padding: 3rem; }
  .error { background: #fef2f2; border-left: 4px solid #ef4444; color: #b91c1c; padding: 1.25rem; border-radius: 0.5rem; }
  .details { margin-top: 0.75rem; padding: 0.75rem; background: #fee2e2; border-radius: 0.375rem; font-size: 0.875rem; }
  .suggestion { margin-top: 1rem; padding: 0.75rem; background: #fefce8; border: 1px solid #fef08a; border-radius: 0.375rem; color: #854d0e; }
  .footer { color: #9ca3af; font-size: 0.8rem; text-align: right; margin-top: 1.5rem; }
</style>
</head>
<body>
<main>
<div class="panel">
<h1>Network Dashboard</h1>
<p class="subtitle">Peer Wins and Network Status</p>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: &str, address: &str, wins: u64) -> PeerRecord {
        PeerRecord {
            peer_id: id.to_string(),
            wallet_address: address.to_string(),
            total_wins: wins,
        }
    }

    fn sample() -> Vec<PeerRecord> {
        vec![
            peer("bravo", "0xBBBB000000000000000000000000000000000002", 10),
            peer("alpha", "0xaaaa000000000000000000000000000000000003", 75),
            peer("charlie", "0xcccc000000000000000000000000000000000001", 10),
        ]
    }

    fn ids(peers: &[PeerRecord]) -> Vec<&str> {
        peers.iter().map(|p| p.peer_id.as_str()).collect()
    }

    #[test]
    fn test_truncate_address() {
        let address = "0xabcdef0123456789abcdef0123456789abcd6789";
        assert_eq!(address.len(), 42);
        assert_eq!(truncate_address(address), "0xabcd...6789");
        // Too short to shorten
        assert_eq!(truncate_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_default_sort_is_wins_descending() {
        let mut peers = sample();
        SortState::default().apply(&mut peers);
        // Ties keep input order
        assert_eq!(ids(&peers), vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_click_selects_default_direction() {
        let state = SortState {
            column: SortColumn::PeerId,
            direction: SortDirection::Asc,
        };
        let wins = state.click(SortColumn::TotalWins);
        assert_eq!(wins.direction, SortDirection::Desc);

        let address = wins.click(SortColumn::WalletAddress);
        assert_eq!(address.column, SortColumn::WalletAddress);
        assert_eq!(address.direction, SortDirection::Asc);
    }

    #[test]
    fn test_clicking_active_column_twice_round_trips() {
        for column in SortColumn::ALL {
            let start = SortState::default().click(column);
            let mut original = sample();
            start.apply(&mut original);

            let twice = start.click(column).click(column);
            assert_eq!(twice, start);

            let mut again = sample();
            twice.apply(&mut again);
            assert_eq!(again, original);
        }
    }

    #[test]
    fn test_address_sort_ignores_case() {
        let mut peers = sample();
        SortState {
            column: SortColumn::WalletAddress,
            direction: SortDirection::Asc,
        }
        .apply(&mut peers);
        assert_eq!(ids(&peers), vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_query_sort_state() {
        let query = DashboardQuery {
            sort: Some(SortColumn::PeerId),
            ..Default::default()
        };
        assert_eq!(query.sort_state().direction, SortDirection::Asc);
        assert_eq!(DashboardQuery::default().sort_state(), SortState::default());
    }

    #[test]
    fn test_explorer_link() {
        assert_eq!(
            explorer_link("https://explorer.example/", "0xabc"),
            "https://explorer.example/address/0xabc"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_render_table_page() {
        let result = Ok(ApiResponse {
            peers: vec![
                peer("<script>", "0xabcdef0123456789abcdef0123456789abcd6789", 51),
                peer("quiet", "0x1111111111111111111111111111111111111111", 3),
            ],
            round_info: RoundInfo {
                current_round: 8,
                current_stage: 3,
            },
        });
        let view = PageView {
            result: &result,
            sort: SortState::default(),
            use_mock_data: true,
            explorer_url: "https://explorer.example",
            generated_at: "now".to_string(),
        };

        let html = render_page(&view);

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("0xabcd...6789"));
        assert!(html.contains(
            "https://explorer.example/address/0xabcdef0123456789abcdef0123456789abcd6789"
        ));
        assert_eq!(html.matches("High Performer").count(), 1);
        assert!(html.contains("Using mock data"));
        assert!(html.contains("Use Real Data"));
        // Active wins header links to the flipped direction
        assert!(html.contains("/?sort=totalWins&amp;dir=asc&amp;mock=true"));
        assert!(html.contains("<span class=\"value\">8</span>"));
    }

    #[test]
    fn test_render_empty_table() {
        let result = Ok(ApiResponse {
            peers: vec![],
            round_info: RoundInfo::default(),
        });
        let view = PageView {
            result: &result,
            sort: SortState::default(),
            use_mock_data: false,
            explorer_url: "https://explorer.example",
            generated_at: "now".to_string(),
        };

        assert!(render_page(&view).contains("No peer data available"));
    }

    #[test]
    fn test_render_error_with_suggestion() {
        let result = Err(ErrorResponse::new("Failed to fetch peer data")
            .with_details("rate limit exceeded (HTTP 429)")
            .with_suggestion(Some(
                "You are being rate limited. Try setting USE_MOCK_DATA=true in your configuration."
                    .to_string(),
            )));
        let view = PageView {
            result: &result,
            sort: SortState::default(),
            use_mock_data: false,
            explorer_url: "https://explorer.example",
            generated_at: "now".to_string(),
        };

        let html = render_page(&view);

        assert!(html.contains("Error Encountered"));
        assert!(html.contains("Technical Details"));
        assert!(html.contains("Use Mock Data Instead"));
        assert!(html.contains("/?sort=totalWins&amp;dir=desc&amp;mock=true"));
        assert!(!html.contains("<table>"));
    }
}
