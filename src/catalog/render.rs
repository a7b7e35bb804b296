//! Catalog markup
//!
//! Produces the HTML strings the front-end assigns to `innerHTML`. All
//! interpolated text is escaped.

use chrono::DateTime;

use super::data::{GameCard, NewsItem};

/// Inline SVG used when a game icon fails to load
const FALLBACK_AVATAR: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iNjAiIGhlaWdodD0iNjAiIHZpZXdCb3g9IjAgMCA2MCA2MCIgZmlsbD0ibm9uZSIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48cmVjdCB3aWR0aD0iNjAiIGhlaWdodD0iNjAiIHJ4PSIxNiIgZmlsbD0iIzY2N2VlYSIvPjwvc3ZnPg==";

/// Escape text for use in element content or quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// `★★★★☆` for a 0..=5 rating
pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Short `dd.mm.yyyy` date (UTC)
pub fn format_date(timestamp_ms: f64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default()
}

pub fn render_game_card(game: &GameCard) -> String {
    let name = escape_html(game.name);
    let url = escape_html(game.launch_url);
    let rating = game.rating.min(5);
    format!(
        r#"<div class="game-card" data-game-id="{id}" data-url="{url}">
    <div class="game-card-content">
        <div class="game-image">
            <img src="{image}" alt="{name}" class="game-avatar" draggable="false" onerror="this.src='{fallback}'">
        </div>
        <div class="game-info">
            <div class="game-header">
                <div class="game-title-wrapper">
                    <h3>{name}</h3>
                    <div class="game-genre">{genre}</div>
                    <div class="game-rating">
                        <span class="stars">{stars}</span>
                        <span class="rating-text">{rating}.0</span>
                    </div>
                </div>
            </div>
        </div>
    </div>
    <button class="play-button" data-url="{url}">Играть</button>
</div>"#,
        id = escape_html(game.id),
        image = escape_html(game.image_url),
        genre = escape_html(game.genre),
        stars = stars(rating),
        fallback = FALLBACK_AVATAR,
    )
}

/// Game list, or an empty-state block when there is nothing to show
pub fn render_games(games: &[GameCard]) -> String {
    if games.is_empty() {
        return r#"<div class="empty-state">
    <div class="empty-icon">🎮</div>
    <h3>Игры временно недоступны</h3>
    <p>Попробуйте обновить страницу позже</p>
</div>"#
            .to_string();
    }
    games.iter().map(render_game_card).collect()
}

pub fn render_news_item(item: &NewsItem) -> String {
    let image = item
        .image_url
        .filter(|url| !url.is_empty())
        .map(|url| {
            format!(
                r#"<img src="{}" alt="News image" class="news-image" draggable="false">"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="news-item">
    <span class="news-date">{date}</span>
    <div class="news-title">{title}</div>
    <div class="news-content">{body}</div>
    {image}
</div>"#,
        date = format_date(item.timestamp_ms),
        title = escape_html(item.title),
        body = escape_html(item.body),
    )
}

pub fn render_news(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return r#"<div class="news-item"><p>Новости временно недоступны</p></div>"#.to_string();
    }
    items.iter().map(render_news_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data::{self, GAMES};

    #[test]
    fn test_stars() {
        assert_eq!(stars(4), "★★★★☆");
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_format_date() {
        // 2024-01-20T12:00:00Z
        assert_eq!(format_date(1_705_752_000_000.0), "20.01.2024");
    }

    #[test]
    fn test_render_games() {
        let html = render_games(&GAMES);
        assert_eq!(html.matches(r#"class="game-card""#).count(), GAMES.len());
        assert!(html.contains("Dragon&#39;s Quest"));
        assert!(html.contains(r#"data-url="https://t.me/happyfarm_bot/start""#));
        assert!(html.contains("<span class=\"rating-text\">4.0</span>"));

        assert!(render_games(&[]).contains("empty-state"));
    }

    #[test]
    fn test_render_news() {
        let html = render_news(&data::news(1_705_752_000_000.0));
        assert_eq!(html.matches(r#"class="news-item""#).count(), 3);
        assert!(html.contains("20.01.2024"));
        assert!(html.contains("15.01.2024"));
        assert!(!html.contains("news-image"));

        assert!(render_news(&[]).contains("Новости временно недоступны"));
    }
}
