//! Static catalog content

/// Shown in the footer
pub const APP_VERSION: &str = "2.3.0";
pub const APP_BUILD: &str = "2024.01.20";

const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// A game entry (read-only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameCard {
    pub id: &'static str,
    pub name: &'static str,
    pub genre: &'static str,
    pub image_url: &'static str,
    /// Telegram bot deep link
    pub launch_url: &'static str,
    /// 0..=5 stars
    pub rating: u8,
}

/// A news entry (read-only)
#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    /// Unix timestamp (ms)
    pub timestamp_ms: f64,
    pub image_url: Option<&'static str>,
}

pub const GAMES: [GameCard; 4] = [
    GameCard {
        id: "1",
        name: "Dragon's Quest",
        genre: "RPG | Fantasy",
        image_url: "https://img.icons8.com/color/70/000000/dragon.png",
        launch_url: "https://t.me/dragonsquest_bot/start",
        rating: 4,
    },
    GameCard {
        id: "2",
        name: "Cyberpunk Drift",
        genre: "Racing | Sci-Fi",
        image_url: "https://img.icons8.com/color/70/000000/cyberpunk.png",
        launch_url: "https://t.me/cyberpunkdrift_bot/start",
        rating: 4,
    },
    GameCard {
        id: "3",
        name: "Cosmic Warfare",
        genre: "Strategy | Sci Sim",
        image_url: "https://img.icons8.com/color/70/000000/space-shuttle.png",
        launch_url: "https://t.me/cosmicwarfare_bot/start",
        rating: 4,
    },
    GameCard {
        id: "4",
        name: "Happy Farm",
        genre: "Simulation | Farming",
        image_url: "https://img.icons8.com/color/70/000000/farm.png",
        launch_url: "https://t.me/happyfarm_bot/start",
        rating: 4,
    },
];

/// News feed, dated relative to `now` (ms)
pub fn news(now: f64) -> Vec<NewsItem> {
    vec![
        NewsItem {
            id: "1",
            title: "Добро пожаловать в Games Verse!",
            body: "Запущена новая игровая платформа с лучшими играми Telegram. Теперь все игры в одном месте!",
            timestamp_ms: now,
            image_url: None,
        },
        NewsItem {
            id: "2",
            title: "Новые игры добавлены",
            body: "В каталог добавлены популярные игры: Dragon's Quest, Cyberpunk Drift, Cosmic Warfare и Happy Farm.",
            timestamp_ms: now - 2.0 * DAY_MS,
            image_url: None,
        },
        NewsItem {
            id: "3",
            title: "Обновление дизайна",
            body: "Полностью обновлен интерфейс приложения. Улучшена навигация и добавлены новые функции.",
            timestamp_ms: now - 5.0 * DAY_MS,
            image_url: None,
        },
    ]
}

/// Look up a game by id
pub fn game(id: &str) -> Option<&'static GameCard> {
    GAMES.iter().find(|g| g.id == id)
}
