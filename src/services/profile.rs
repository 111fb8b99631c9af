// src/services/profile.rs

//! Member profile extraction service.
//!
//! Fetches a member page and extracts structured fields from it using the
//! configured locators. Each field extracts independently: a failed field
//! records a soft error on the profile and leaves the field at its zero
//! value, so one broken locator never blanks out the rest of the page.
//! Only the username is different: a page without one is not a member
//! page at all, and the whole call fails.

use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    Config, FieldError, ProfileField, ProfileSelectors, UserProfile, VisitorMessage,
};
use crate::utils::{self, http, parse_grouped_int};

/// Outcome of one field extraction attempt.
type FieldResult<T> = std::result::Result<T, FieldError>;

/// Per-field extraction attempts from the member page itself, before the
/// reputation lookup joins them.
struct PageFields {
    user_name: String,
    join_date: FieldResult<String>,
    total_posts: FieldResult<u32>,
    bio_text: FieldResult<String>,
    visitor_messages: FieldResult<Vec<VisitorMessage>>,
}

/// Service for extracting member profiles.
pub struct ProfileScraper {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl ProfileScraper {
    /// Create a new profile scraper using the given HTTP client.
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Fetch a member page and extract its profile.
    ///
    /// A transport failure or a page without a resolvable username aborts
    /// the whole call; anything else degrades field by field.
    pub async fn fetch_profile(&self, url: &str) -> Result<UserProfile> {
        // Documents are parsed and consumed inside a block so none is
        // held across the reputation lookup's awaits.
        let fields = {
            let document = http::fetch_page(&self.client, url).await?;
            extract_page_fields(url, &document, &self.config.selectors)?
        };

        let reputation = self.fetch_reputation(url).await;

        Ok(assemble_profile(fields, reputation))
    }

    /// Look up a member's reputation score.
    ///
    /// The profile page does not carry reputation, so it is read off the
    /// member's most recent post: find-user search, first post permalink,
    /// then the post table named by the permalink's fragment. A failure at
    /// any hop is one soft failure for the field; later hops are skipped.
    async fn fetch_reputation(&self, profile_url: &str) -> FieldResult<i64> {
        let selectors = &self.config.selectors;
        let base = &self.config.forum.base_url;

        let member_id = utils::member_id_from_url(profile_url).map_err(rep_error)?;
        let search_url = utils::search_page_url(base, member_id).map_err(rep_error)?;

        let permalink = {
            let search_page = http::fetch_page(&self.client, &search_url)
                .await
                .map_err(rep_error)?;
            first_post_permalink(&search_page, selectors)?
        };

        let anchor = post_anchor(&permalink)?;
        let post_url = utils::resolve(base, &permalink).ok_or_else(|| {
            FieldError::new(
                ProfileField::Reputation,
                format!("unresolvable permalink: {permalink}"),
            )
        })?;

        let thread_page = http::fetch_page(&self.client, &post_url)
            .await
            .map_err(rep_error)?;
        reputation_in_post(&thread_page, &anchor, selectors)
    }
}

/// Run the per-field extractors over a fetched member page.
///
/// Username failure is fatal; every other attempt is carried as a result
/// for [`assemble_profile`] to fold.
fn extract_page_fields(
    url: &str,
    document: &Html,
    selectors: &ProfileSelectors,
) -> Result<PageFields> {
    let user_name =
        extract_user_name(document, selectors).map_err(|m| AppError::invalid_page(url, m))?;

    Ok(PageFields {
        user_name,
        join_date: extract_join_date(document, selectors),
        total_posts: extract_total_posts(document, selectors),
        bio_text: extract_bio(document, selectors),
        visitor_messages: extract_visitor_messages(document, selectors),
    })
}

/// Fold the extraction attempts into the final profile, recording soft
/// failures in the fixed field order: join date, total posts, reputation,
/// bio, visitor messages.
fn assemble_profile(fields: PageFields, reputation: FieldResult<i64>) -> UserProfile {
    let mut profile = UserProfile {
        user_name: fields.user_name,
        ..UserProfile::default()
    };

    match fields.join_date {
        Ok(join_date) => profile.join_date = join_date,
        Err(e) => profile.errors.push(e),
    }
    match fields.total_posts {
        Ok(total_posts) => profile.total_posts = total_posts,
        Err(e) => profile.errors.push(e),
    }
    match reputation {
        Ok(reputation) => profile.reputation = reputation,
        Err(e) => profile.errors.push(e),
    }
    match fields.bio_text {
        Ok(bio_text) => profile.bio_text = bio_text,
        Err(e) => profile.errors.push(e),
    }
    match fields.visitor_messages {
        Ok(visitor_messages) => profile.visitor_messages = visitor_messages,
        Err(e) => profile.errors.push(e),
    }

    profile
}

/// Extract the profile owner's name.
///
/// Errors carry only a message; the caller turns them into the fatal
/// invalid-page error.
fn extract_user_name(
    document: &Html,
    selectors: &ProfileSelectors,
) -> std::result::Result<String, String> {
    let sel = Selector::parse(&selectors.user_name_selector).map_err(|e| {
        format!(
            "invalid selector '{}': {e:?}",
            selectors.user_name_selector
        )
    })?;

    let name = document
        .select(&sel)
        .next()
        .map(|el| normalize_text(&el))
        .ok_or_else(|| "no username element".to_string())?;

    if name.is_empty() {
        return Err("username element is empty".to_string());
    }
    Ok(name)
}

/// Extract the raw join date, label stripped.
fn extract_join_date(document: &Html, selectors: &ProfileSelectors) -> FieldResult<String> {
    labeled_stat(
        document,
        selectors,
        ProfileField::JoinDate,
        &selectors.join_date_label,
    )
}

/// Extract the post count, tolerating thousands separators.
fn extract_total_posts(document: &Html, selectors: &ProfileSelectors) -> FieldResult<u32> {
    let raw = labeled_stat(
        document,
        selectors,
        ProfileField::TotalPosts,
        &selectors.total_posts_label,
    )?;

    parse_grouped_int(&raw)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| FieldError::new(ProfileField::TotalPosts, format!("not a post count: '{raw}'")))
}

/// Find the statistics entry carrying the given label and strip the label.
fn labeled_stat(
    document: &Html,
    selectors: &ProfileSelectors,
    field: ProfileField,
    label: &str,
) -> FieldResult<String> {
    let sel = field_selector(field, &selectors.stats_item_selector)?;

    document
        .select(&sel)
        .map(|el| normalize_text(&el))
        .find_map(|text| text.strip_prefix(label).map(|rest| rest.trim().to_string()))
        .ok_or_else(|| FieldError::new(field, format!("no entry labeled '{}'", label.trim())))
}

/// Extract the "about me" text.
fn extract_bio(document: &Html, selectors: &ProfileSelectors) -> FieldResult<String> {
    let sel = field_selector(ProfileField::Bio, &selectors.bio_selector)?;

    document
        .select(&sel)
        .next()
        .map(|el| normalize_text(&el))
        .ok_or_else(|| FieldError::new(ProfileField::Bio, "no bio element"))
}

/// Extract visitor messages in page order.
///
/// A missing container is a soft failure; a malformed message block is
/// skipped silently rather than recorded.
fn extract_visitor_messages(
    document: &Html,
    selectors: &ProfileSelectors,
) -> FieldResult<Vec<VisitorMessage>> {
    let field = ProfileField::VisitorMessages;
    let list_sel = field_selector(field, &selectors.message_list_selector)?;
    let row_sel = field_selector(field, &selectors.message_row_selector)?;
    let author_sel = field_selector(field, &selectors.message_author_selector)?;
    let body_sel = field_selector(field, &selectors.message_body_selector)?;

    if document.select(&list_sel).next().is_none() {
        return Err(FieldError::new(field, "no visitor message container"));
    }

    Ok(document
        .select(&row_sel)
        .filter_map(|row| parse_message_row(&row, &author_sel, &body_sel))
        .collect())
}

/// Parse one message block, or `None` if either piece is missing.
fn parse_message_row(
    row: &ElementRef,
    author_sel: &Selector,
    body_sel: &Selector,
) -> Option<VisitorMessage> {
    let author = row.select(author_sel).next()?;
    let body = row.select(body_sel).next()?;

    let user_name = normalize_text(&author);
    if user_name.is_empty() {
        return None;
    }

    Some(VisitorMessage {
        user_name,
        message: normalize_text(&body),
    })
}

/// First post permalink on the find-user search page.
fn first_post_permalink(document: &Html, selectors: &ProfileSelectors) -> FieldResult<String> {
    let sel = field_selector(ProfileField::Reputation, &selectors.search_post_link_selector)?;

    document
        .select(&sel)
        .find_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .ok_or_else(|| FieldError::new(ProfileField::Reputation, "no posts found for member"))
}

/// The post anchor id named by a permalink's fragment.
fn post_anchor(permalink: &str) -> FieldResult<String> {
    permalink
        .split_once('#')
        .map(|(_, fragment)| fragment.to_string())
        .filter(|fragment| !fragment.is_empty())
        .ok_or_else(|| {
            FieldError::new(
                ProfileField::Reputation,
                format!("permalink has no post anchor: {permalink}"),
            )
        })
}

/// Reputation score inside the post table named by `anchor`.
///
/// If several cells mention the label, the last one wins.
fn reputation_in_post(
    document: &Html,
    anchor: &str,
    selectors: &ProfileSelectors,
) -> FieldResult<i64> {
    let field = ProfileField::Reputation;
    let table_sel = field_selector(field, &format!("table#{anchor}"))?;
    let cell_sel = field_selector(field, &selectors.reputation_cell_selector)?;
    let label = &selectors.reputation_label;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| FieldError::new(field, format!("no post table with id '{anchor}'")))?;

    let raw = table
        .select(&cell_sel)
        .map(|el| normalize_text(&el))
        .filter_map(|text| {
            text.find(label.as_str())
                .map(|at| text[at + label.len()..].trim().to_string())
        })
        .last()
        .ok_or_else(|| {
            FieldError::new(field, format!("no '{}' entry in post", label.trim()))
        })?;

    parse_grouped_int(&raw)
        .ok_or_else(|| FieldError::new(field, format!("not a reputation score: '{raw}'")))
}

/// Collapse any failed hop of the reputation chain into one soft failure.
fn rep_error(e: impl std::fmt::Display) -> FieldError {
    FieldError::new(ProfileField::Reputation, e.to_string())
}

/// Parse a configured selector, reporting failure against the field.
fn field_selector(field: ProfileField, selector: &str) -> FieldResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| FieldError::new(field, format!("invalid selector '{selector}': {e:?}")))
}

/// Collect an element's text with whitespace collapsed.
///
/// Profile page entries span nested elements and carry layout newlines,
/// so label matching needs the flattened form.
fn normalize_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> ProfileSelectors {
        ProfileSelectors::default()
    }

    const MEMBER_PAGE: &str = r#"
        <html><body>
        <div id="username_box"><h1>
            Kalcor
        </h1></div>
        <div id="collapseobj_stats"><div>
            <fieldset><ul>
                <li>Total Posts: 12,345</li>
                <li>Posts Per Day: 2.61</li>
            </ul></fieldset>
            <fieldset><ul>
                <li>Join Date: March 2009</li>
            </ul></fieldset>
        </div></div>
        <div id="collapseobj_aboutme"><div><ul><li>
            <dl><dd>Scripting the gamemode.</dd></dl>
        </li></ul></div></div>
        <ol id="message_list">
            <li>
                <div class="message_head"><a class="username" href="member.php?u=5">Jay</a></div>
                <div class="message_text">Nice update!</div>
            </li>
            <li>
                <div class="message_head"><a class="username" href="member.php?u=9">Woet</a></div>
                <div class="message_text">When is 0.4?</div>
            </li>
        </ol>
        </body></html>"#;

    #[test]
    fn extracts_every_field_from_a_full_page() {
        let document = Html::parse_document(MEMBER_PAGE);
        let fields = extract_page_fields("http://forum.sa-mp.com/member.php?u=3", &document, &selectors())
            .unwrap();
        let profile = assemble_profile(fields, Ok(42));

        assert_eq!(profile.user_name, "Kalcor");
        assert_eq!(profile.join_date, "March 2009");
        assert_eq!(profile.total_posts, 12345);
        assert_eq!(profile.reputation, 42);
        assert_eq!(profile.bio_text, "Scripting the gamemode.");
        assert_eq!(profile.visitor_messages.len(), 2);
        assert_eq!(profile.visitor_messages[0].user_name, "Jay");
        assert_eq!(profile.visitor_messages[1].message, "When is 0.4?");
        assert!(profile.errors.is_empty());
    }

    #[test]
    fn missing_username_is_fatal() {
        let document = Html::parse_document("<html><body><p>Please log in</p></body></html>");
        let result = extract_page_fields("http://example.com/member.php?u=3", &document, &selectors());
        assert!(matches!(result, Err(AppError::InvalidPage { .. })));
    }

    #[test]
    fn empty_username_is_fatal() {
        let document = Html::parse_document(
            r#"<div id="username_box"><h1>   </h1></div>"#,
        );
        let result = extract_page_fields("http://example.com/member.php?u=3", &document, &selectors());
        assert!(matches!(result, Err(AppError::InvalidPage { .. })));
    }

    #[test]
    fn missing_join_date_is_one_soft_failure() {
        let page = MEMBER_PAGE.replace("Join Date: March 2009", "Something else");
        let document = Html::parse_document(&page);
        let fields = extract_page_fields("http://x/member.php?u=3", &document, &selectors()).unwrap();
        let profile = assemble_profile(fields, Ok(0));

        assert_eq!(profile.user_name, "Kalcor");
        assert_eq!(profile.join_date, "");
        assert_eq!(profile.errors.len(), 1);
        assert_eq!(profile.errors[0].field, ProfileField::JoinDate);
    }

    #[test]
    fn non_numeric_post_count_is_a_soft_failure() {
        let page = MEMBER_PAGE.replace("Total Posts: 12,345", "Total Posts: many");
        let document = Html::parse_document(&page);
        let fields = extract_page_fields("http://x/member.php?u=3", &document, &selectors()).unwrap();
        let profile = assemble_profile(fields, Ok(0));

        assert_eq!(profile.total_posts, 0);
        assert_eq!(profile.errors.len(), 1);
        assert_eq!(profile.errors[0].field, ProfileField::TotalPosts);
    }

    #[test]
    fn soft_failures_accumulate_in_field_order() {
        // Keep only the username: stats, bio and message container gone.
        let document = Html::parse_document(
            r#"<div id="username_box"><h1>Kalcor</h1></div>"#,
        );
        let fields = extract_page_fields("http://x/member.php?u=3", &document, &selectors()).unwrap();
        let profile = assemble_profile(
            fields,
            Err(FieldError::new(ProfileField::Reputation, "no posts found for member")),
        );

        let failed: Vec<ProfileField> = profile.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            failed,
            vec![
                ProfileField::JoinDate,
                ProfileField::TotalPosts,
                ProfileField::Reputation,
                ProfileField::Bio,
                ProfileField::VisitorMessages,
            ]
        );
    }

    #[test]
    fn malformed_message_blocks_are_skipped_silently() {
        let page = MEMBER_PAGE.replace(
            r#"<div class="message_head"><a class="username" href="member.php?u=9">Woet</a></div>"#,
            r#"<div class="message_head"></div>"#,
        );
        let document = Html::parse_document(&page);
        let fields = extract_page_fields("http://x/member.php?u=3", &document, &selectors()).unwrap();
        let profile = assemble_profile(fields, Ok(0));

        assert_eq!(profile.visitor_messages.len(), 1);
        assert_eq!(profile.visitor_messages[0].user_name, "Jay");
        assert!(!profile.field_failed(ProfileField::VisitorMessages));
    }

    #[test]
    fn absent_message_container_is_a_soft_failure() {
        let page = MEMBER_PAGE.replace(r#"id="message_list""#, r#"id="something_else""#);
        let document = Html::parse_document(&page);
        let fields = extract_page_fields("http://x/member.php?u=3", &document, &selectors()).unwrap();
        let profile = assemble_profile(fields, Ok(0));

        assert!(profile.visitor_messages.is_empty());
        assert!(profile.field_failed(ProfileField::VisitorMessages));
    }

    #[test]
    fn search_page_without_post_links_fails_softly() {
        let document = Html::parse_document(
            r#"<table><tr><td class="alt1">Sorry - no matches.</td></tr></table>"#,
        );
        let result = first_post_permalink(&document, &selectors());
        assert_eq!(result.unwrap_err().field, ProfileField::Reputation);
    }

    #[test]
    fn first_post_permalink_takes_the_first_match() {
        let document = Html::parse_document(
            r#"<table>
                <tr><td class="alt1"><div class="alt2"><div><em>
                    <a href="showthread.php?t=42#post777">Latest post</a>
                </em></div></div></td></tr>
                <tr><td class="alt1"><div class="alt2"><div><em>
                    <a href="showthread.php?t=41#post700">Older post</a>
                </em></div></div></td></tr>
            </table>"#,
        );
        assert_eq!(
            first_post_permalink(&document, &selectors()).unwrap(),
            "showthread.php?t=42#post777"
        );
    }

    #[test]
    fn post_anchor_requires_a_fragment() {
        assert_eq!(post_anchor("showthread.php?t=42#post777").unwrap(), "post777");
        assert!(post_anchor("showthread.php?t=42").is_err());
        assert!(post_anchor("showthread.php?t=42#").is_err());
    }

    #[test]
    fn reputation_is_read_from_the_anchored_table() {
        let document = Html::parse_document(
            r#"<table id="post700"><tr valign="top"><td class="alt2">
                <div>Reputation: 9,999</div>
            </td></tr></table>
            <table id="post777"><tr valign="top"><td class="alt2">
                <div>Join Date: Mar 2009</div>
                <div>Reputation: 1,204</div>
            </td></tr></table>"#,
        );
        assert_eq!(
            reputation_in_post(&document, "post777", &selectors()).unwrap(),
            1204
        );
    }

    #[test]
    fn last_reputation_match_wins() {
        let document = Html::parse_document(
            r#"<table id="post777"><tr valign="top"><td class="alt2">
                <div>Reputation: 100</div>
                <div>Reputation: -7</div>
            </td></tr></table>"#,
        );
        assert_eq!(
            reputation_in_post(&document, "post777", &selectors()).unwrap(),
            -7
        );
    }

    #[test]
    fn missing_anchor_table_fails_softly() {
        let document = Html::parse_document(
            r#"<table id="post700"><tr><td class="alt2"><div>Reputation: 1</div></td></tr></table>"#,
        );
        let result = reputation_in_post(&document, "post777", &selectors());
        assert_eq!(result.unwrap_err().field, ProfileField::Reputation);
    }

    #[test]
    fn unparsable_reputation_fails_softly() {
        let document = Html::parse_document(
            r#"<table id="post777"><tr><td class="alt2"><div>Reputation: hidden</div></td></tr></table>"#,
        );
        let result = reputation_in_post(&document, "post777", &selectors());
        assert_eq!(result.unwrap_err().field, ProfileField::Reputation);
    }
}
