//! [`MapSurface`] over a Chrome DevTools session.
//!
//! Selectors rely on ARIA roles, labels and a few stable class names of the
//! rendered map UI. Labels come from [`LocaleConfig`].

use crate::config::toml_config::{BrowserConfig, LocaleConfig};
use crate::domain::ports::{BylineKind, GalleryItem, ListingSnapshot, MapSurface, RawByline};
use crate::utils::error::{HarvestError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

const SEARCH_BOX: &str = "#searchboxinput";
const RESULT_ITEM: &str = "div:has(div>a)";
const RESULT_ANCHOR: &str = "div>a";
const RATING_BADGE: &str = r#"span.fontBodyMedium span[role="img"] span:first-child"#;
const REVIEWER_BADGE: &str = r#"span.fontBodyMedium span[role="img"] span:last-child"#;
const NO_THUMBNAIL: &str =
    r#"img[src="//maps.gstatic.com/tactile/pane/result-no-thumbnail-1x.png"]"#;
const GALLERY_TILE: &str = r##"div:last-child>div:first-child div>div>a[href="#"]"##;
const VIDEO_CAPTION: &str = r#"div[role="img"]>div.fontLabelMedium"#;
const LOADED_IMAGE: &str = r#"div[role="img"]>div.loaded"#;
const OWNER_BYLINE: &str = r#"div#titlecard div[role="navigation"] h1>span:last-child:has(a)"#;
const CONTRIBUTOR_BYLINE: &str = r#"div[role="navigation"] h2.fontBodySmall>span:has(a)"#;
const BYLINE_AVATAR: &str = "a:first-child>div";
const BYLINE_PROFILE: &str = "a:first-child";
const BYLINE_NAME: &str = "a:last-child>span";

const JS_CLICK: &str = "function() { this.click(); }";
const JS_SCROLL_TO_BOTTOM: &str =
    "function() { this.scrollBy(0, this.scrollHeight); return this.scrollHeight; }";
const JS_BACKGROUND_IMAGE: &str =
    "function() { return window.getComputedStyle(this).backgroundImage; }";

/// Quotes a value for use inside a `[attr="..."]` selector.
fn css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Maps "no such node" answers to `None`, keeping real transport errors.
fn absent<T>(result: std::result::Result<T, CdpError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CdpError::NotFound) | Err(CdpError::Chrome(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn background_image(element: &Element) -> Result<Option<String>> {
    let returns = element.call_js_fn(JS_BACKGROUND_IMAGE, false).await?;
    Ok(returns
        .result
        .value
        .and_then(|value| value.as_str().map(str::to_string)))
}

async fn text_of(root: &Element, selector: &str) -> Result<Option<String>> {
    match absent(root.find_element(selector).await)? {
        Some(element) => Ok(element.inner_text().await?),
        None => Ok(None),
    }
}

/// A launched browser plus the task pumping its CDP event stream.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    pub async fn launch(settings: &BrowserConfig) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .window_size(settings.window_width, settings.window_height)
            .viewport(None);
        if !settings.headless {
            builder = builder.with_head();
        }
        let chrome_config = builder
            .build()
            .map_err(|message| HarvestError::ConfigError { message })?;

        let (browser, mut handler) = Browser::launch(chrome_config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler stopped: {}", e);
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    pub async fn open_surface(&self, locale: LocaleConfig, home_url: String) -> Result<ChromeMapSurface> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromeMapSurface::new(page, locale, home_url))
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

pub struct ChromeMapSurface {
    page: Page,
    locale: LocaleConfig,
    home_url: String,
}

impl ChromeMapSurface {
    pub fn new(page: Page, locale: LocaleConfig, home_url: String) -> Self {
        Self {
            page,
            locale,
            home_url,
        }
    }

    fn results_selector(&self, query: &str) -> String {
        format!(
            r#"div[aria-label="{}"]"#,
            css_string(&format!("{} {}", self.locale.results_label, query))
        )
    }

    fn gallery_entry_selector(&self, title: &str) -> String {
        format!(
            r#"div[aria-label="{}"][role="main"] button[aria-label="{}"]"#,
            css_string(title),
            css_string(&format!("{} {}", self.locale.photos_label, title))
        )
    }

    fn gallery_panel_selector(&self, title: &str) -> String {
        format!(
            r#"div[aria-label="{}"][role="main"]"#,
            css_string(&format!("{} {}", self.locale.photos_label, title))
        )
    }

    async fn results_container(&self, query: &str) -> Result<Option<Element>> {
        absent(self.page.find_element(self.results_selector(query)).await)
    }

    async fn gallery_tiles(&self, title: &str) -> Result<Vec<Element>> {
        match absent(self.page.find_element(self.gallery_panel_selector(title)).await)? {
            Some(panel) => Ok(panel.find_elements(GALLERY_TILE).await?),
            None => Ok(Vec::new()),
        }
    }

    async fn gallery_tile(&self, title: &str, index: usize) -> Result<Element> {
        self.gallery_tiles(title)
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| HarvestError::processing(format!("gallery tile {} is gone", index)))
    }

    async fn listing(&self, item: &Element) -> Result<ListingSnapshot> {
        let anchor = absent(item.find_element(RESULT_ANCHOR).await)?;
        let (link, title) = match &anchor {
            Some(anchor) => {
                let href = anchor
                    .property("href")
                    .await?
                    .and_then(|value| value.as_str().map(str::to_string));
                (href, anchor.attribute("aria-label").await?)
            }
            None => (None, None),
        };

        Ok(ListingSnapshot {
            link,
            title,
            rating_text: text_of(item, RATING_BADGE).await?,
            reviewer_text: text_of(item, REVIEWER_BADGE).await?,
            has_placeholder_thumbnail: absent(item.find_element(NO_THUMBNAIL).await)?.is_some(),
        })
    }
}

#[async_trait]
impl MapSurface for ChromeMapSurface {
    async fn open_home(&self) -> Result<()> {
        self.page.goto(self.home_url.as_str()).await?;
        Ok(())
    }

    async fn submit_search(&self, query: &str) -> Result<()> {
        self.page
            .find_element(SEARCH_BOX)
            .await?
            .click()
            .await?
            .type_str(query)
            .await?
            .press_key("Enter")
            .await?;
        Ok(())
    }

    async fn results_ready(&self, query: &str) -> Result<bool> {
        Ok(self.results_container(query).await?.is_some())
    }

    async fn scroll_results(&self, query: &str) -> Result<u64> {
        let container = self
            .results_container(query)
            .await?
            .ok_or_else(|| HarvestError::processing("result list disappeared"))?;
        let returns = container.call_js_fn(JS_SCROLL_TO_BOTTOM, false).await?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_f64())
            .map(|height| height as u64)
            .unwrap_or_default())
    }

    async fn result_items(&self, query: &str) -> Result<Vec<ListingSnapshot>> {
        let Some(container) = self.results_container(query).await? else {
            return Ok(Vec::new());
        };

        let items = container.find_elements(RESULT_ITEM).await?;
        let mut listings = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.listing(item).await {
                Ok(listing) => listings.push(listing),
                Err(e) => {
                    tracing::debug!("Listing {} unreadable: {}", index, e);
                    listings.push(ListingSnapshot::default());
                }
            }
        }
        Ok(listings)
    }

    async fn open_place(&self, link: &str) -> Result<()> {
        self.page.goto(link).await?;
        Ok(())
    }

    async fn about_text(&self, title: &str) -> Result<Option<String>> {
        let selector = format!(
            r#"div[role="region"][aria-label="{}"] div.fontBodyMedium div>div:first-child"#,
            css_string(&format!("{} {}", self.locale.about_label, title))
        );
        match absent(self.page.find_element(selector).await)? {
            Some(element) => Ok(element.inner_text().await?),
            None => Ok(None),
        }
    }

    async fn address_text(&self, _title: &str) -> Result<Option<String>> {
        let selector = format!(
            r#"div[role="region"] button[data-tooltip="{}"] div.fontBodyMedium"#,
            css_string(&self.locale.copy_address_tooltip)
        );
        match absent(self.page.find_element(selector).await)? {
            Some(element) => Ok(element.inner_text().await?),
            None => Ok(None),
        }
    }

    async fn gallery_entry_present(&self, title: &str) -> Result<bool> {
        Ok(absent(self.page.find_element(self.gallery_entry_selector(title)).await)?.is_some())
    }

    async fn open_gallery(&self, title: &str) -> Result<()> {
        let entry = self.page.find_element(self.gallery_entry_selector(title)).await?;
        entry.call_js_fn(JS_CLICK, false).await?;
        Ok(())
    }

    async fn gallery_ready(&self, title: &str) -> Result<bool> {
        Ok(!self.gallery_tiles(title).await?.is_empty())
    }

    async fn gallery_items(&self, title: &str) -> Result<Vec<GalleryItem>> {
        let tiles = self.gallery_tiles(title).await?;
        let mut items = Vec::with_capacity(tiles.len());
        for (index, tile) in tiles.iter().enumerate() {
            let is_video = absent(tile.find_element(VIDEO_CAPTION).await)?.is_some();
            items.push(GalleryItem { index, is_video });
        }
        Ok(items)
    }

    async fn select_gallery_item(&self, title: &str, index: usize) -> Result<()> {
        let tile = self.gallery_tile(title, index).await?;
        tile.call_js_fn(JS_CLICK, false).await?;
        Ok(())
    }

    async fn loaded_image_style(&self, title: &str, index: usize) -> Result<Option<String>> {
        let tile = self.gallery_tile(title, index).await?;
        match absent(tile.find_element(LOADED_IMAGE).await)? {
            Some(surface) => background_image(&surface).await,
            None => Ok(None),
        }
    }

    async fn byline(&self, kind: BylineKind) -> Result<Option<RawByline>> {
        let selector = match kind {
            BylineKind::PlaceOwner => OWNER_BYLINE,
            BylineKind::Contributor => CONTRIBUTOR_BYLINE,
        };
        let Some(root) = absent(self.page.find_element(selector).await)? else {
            return Ok(None);
        };

        let avatar_style = match absent(root.find_element(BYLINE_AVATAR).await)? {
            Some(avatar) => background_image(&avatar).await?,
            None => None,
        };
        let profile_link = match absent(root.find_element(BYLINE_PROFILE).await)? {
            Some(link) => link.attribute("href").await?,
            None => None,
        };

        Ok(Some(RawByline {
            name: text_of(&root, BYLINE_NAME).await?,
            profile_link,
            avatar_style,
        }))
    }
}
