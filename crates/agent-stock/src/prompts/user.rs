//! User message templates for the analysis steps

/// Step 2: quote handed over as pretty-printed JSON
pub const ANALYZE_PRICE: (&str, &str) = (
    "stock.user.analyze_price",
    "Analyze this stock data: {{ quote_json }}",
);

/// Step 3: one line per headline
pub const NEWS_SUMMARY: (&str, &str) = (
    "stock.user.news_summary",
    "News data:\n{% for article in articles %}- {{ article.title }} ({{ article.source }}){% if not loop.last %}\n{% endif %}{% endfor %}",
);

/// Step 5
pub const RECOMMENDATION: (&str, &str) = (
    "stock.user.recommendation",
    "Provide a trading recommendation for {{ symbol }}.",
);

/// Every user template, as `(name, source)` pairs
pub const USER_TEMPLATES: [(&str, &str); 3] = [ANALYZE_PRICE, NEWS_SUMMARY, RECOMMENDATION];
