use chrono::NaiveDate;
use std::fmt::Write;
use yearreview_core::analytics::{month_name, ActivityCalendar, ReportPeriod};
use yearreview_core::format::{
    display_model_name, format_duration_ms, format_number, format_number_full, truncate_label,
};
use yearreview_core::AggregatedView;

const INACTIVE: &str = "var(--dot-inactive)";
const TOP_MODELS: usize = 5;
const LEGEND_LABEL_CHARS: usize = 20;

/// Inputs to the report that are not part of the aggregated data.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext {
    /// Period drawn in the calendar and weekly bars
    pub period: ReportPeriod,
    /// Reference date for "started N days ago"
    pub today: NaiveDate,
}

const STYLE: &str = r#"
        :root {
            --bg-dark: #1a1a1a;
            --bg-card: #252525;
            --text-primary: #ffffff;
            --text-secondary: #888888;
            --text-dim: #555555;
            --dot-inactive: #333333;
            --accent: #ff6b35;
        }

        body {
            font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
            background-color: var(--bg-dark);
            color: var(--text-primary);
            margin: 0;
            padding: 0;
            line-height: 1.5;
        }

        .container {
            max-width: 1000px;
            margin: 0 auto;
            padding: 40px 20px;
        }

        .sources-badge {
            color: var(--text-secondary);
            font-size: 14px;
            margin-bottom: 12px;
        }

        .legend {
            display: flex;
            flex-wrap: wrap;
            gap: 16px;
            margin-bottom: 24px;
        }

        .legend-item {
            display: flex;
            align-items: center;
            gap: 6px;
            font-size: 13px;
            color: var(--text-secondary);
        }

        .legend-dot {
            width: 10px;
            height: 10px;
            border-radius: 50%;
        }

        .host-stats-section {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
            gap: 16px;
            margin-bottom: 48px;
        }

        .host-stat-card {
            background: var(--bg-card);
            border-radius: 12px;
            padding: 16px 20px;
        }

        .host-name {
            font-weight: 700;
            margin-bottom: 8px;
        }

        .host-stats-grid {
            display: grid;
            grid-template-columns: repeat(2, 1fr);
            gap: 6px;
        }

        .host-stat-value {
            font-weight: 600;
            margin-right: 4px;
        }

        .host-stat-label {
            color: var(--text-secondary);
            font-size: 12px;
        }

        .section {
            margin-bottom: 64px;
        }

        .section-title {
            font-size: 2.2rem;
            font-weight: 800;
            margin: 0 0 24px 0;
        }

        .stats-row {
            display: flex;
            gap: 48px;
            margin-bottom: 24px;
        }

        .stat-label, .card-stat-label {
            color: var(--text-secondary);
            font-size: 12px;
            text-transform: uppercase;
            letter-spacing: 1px;
        }

        .stat-value {
            font-size: 2.5rem;
            font-weight: 700;
            color: var(--accent);
        }

        .weeks-grid {
            display: grid;
            grid-template-columns: repeat(13, 1fr);
            gap: 6px;
        }

        .week {
            background: var(--accent);
            border-radius: 6px;
            padding: 6px;
            min-height: 40px;
        }

        .week-label {
            font-size: 10px;
            color: var(--text-primary);
        }

        .week-tokens {
            font-size: 12px;
            font-weight: 700;
        }

        .calendar {
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 16px;
        }

        .month-label {
            color: var(--text-secondary);
            font-size: 12px;
            margin-bottom: 4px;
        }

        .month-days {
            color: var(--text-dim);
            margin-left: 6px;
        }

        .month-dots {
            display: grid;
            grid-template-columns: repeat(7, 12px);
            gap: 3px;
        }

        .dot {
            width: 12px;
            height: 12px;
            border-radius: 50%;
        }

        .summary-card {
            background: var(--bg-card);
            border-radius: 20px;
            padding: 32px;
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 32px;
        }

        .joined {
            color: var(--text-secondary);
            margin-bottom: 16px;
        }

        .model-item {
            margin: 4px 0;
        }

        .model-rank {
            color: var(--accent);
            font-weight: 700;
            margin-right: 6px;
        }

        .card-stats {
            display: grid;
            grid-template-columns: repeat(2, 1fr);
            gap: 16px;
            margin-top: 24px;
        }

        .card-stat-value {
            font-size: 1.5rem;
            font-weight: 700;
        }

        .mini-calendar {
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 8px;
        }

        .mini-month {
            display: grid;
            grid-template-columns: repeat(7, 6px);
            gap: 2px;
        }

        .mini-dot {
            width: 6px;
            height: 6px;
            border-radius: 50%;
        }

        .branding {
            color: var(--text-secondary);
            font-size: 14px;
            margin-top: 20px;
        }

        @media (max-width: 768px) {
            .weeks-grid {
                grid-template-columns: repeat(4, 1fr);
            }

            .summary-card {
                grid-template-columns: 1fr;
            }

            .stats-row {
                flex-direction: column;
                gap: 20px;
            }
        }
"#;

/// Render the aggregated view as a standalone HTML page.
pub fn generate_html_report(view: &AggregatedView, ctx: &ReportContext) -> String {
    let calendar = ActivityCalendar::from_events(&view.events);
    let period = ctx.period;

    let days_ago = view
        .date_range
        .map(|range| (ctx.today - range.first.date()).num_days().max(0))
        .unwrap_or(0);

    let sources_text = if view.sources.len() <= 3 {
        view.sources.join(", ")
    } else {
        format!("{} machines", view.sources.len())
    };

    let longest_session = view
        .longest_session
        .map(|ls| {
            format!(
                "{} ({} messages)",
                format_duration_ms(ls.duration_ms),
                ls.message_count
            )
        })
        .unwrap_or_else(|| "-".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Coding Year in Review {period_name}</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <div class="sources-badge">Data from: {sources_text}</div>
        <div class="legend">{legend}</div>

        <div class="host-stats-section">
            {source_cards}
        </div>

        <section class="section">
            <h1 class="section-title">Agents run on tokens.<br>Millions of them were yours.</h1>
            <div class="stats-row">
                <div class="stat">
                    <div class="stat-label">Tokens Used</div>
                    <div class="stat-value">{total_tokens}</div>
                </div>
            </div>
            <div class="weeks-grid">
                {weeks}
            </div>
        </section>

        <section class="section">
            <h1 class="section-title">Your year, day by day.</h1>
            <div class="stats-row">
                <div class="stat">
                    <div class="stat-label">Days Used</div>
                    <div class="stat-value">{total_days}</div>
                </div>
                <div class="stat">
                    <div class="stat-label">Longest Streak</div>
                    <div class="stat-value">{longest}d</div>
                </div>
                <div class="stat">
                    <div class="stat-label">Current Streak</div>
                    <div class="stat-value">{current}d</div>
                </div>
            </div>
            <div class="calendar">
                {calendar}
            </div>
        </section>

        <section class="section">
            <div class="summary-card">
                <div class="card-left">
                    <div class="joined">Started {days_ago} Days Ago</div>

                    <div class="models-section">
                        <h3>Models</h3>
                        {models}
                    </div>

                    <div class="card-stats">
                        <div>
                            <div class="card-stat-label">Sessions</div>
                            <div class="card-stat-value">{sessions}</div>
                        </div>
                        <div>
                            <div class="card-stat-label">Messages</div>
                            <div class="card-stat-value">{messages}</div>
                        </div>
                        <div>
                            <div class="card-stat-label">Tokens</div>
                            <div class="card-stat-value">{tokens_short}</div>
                        </div>
                        <div>
                            <div class="card-stat-label">Longest Session</div>
                            <div class="card-stat-value">{longest_session}</div>
                        </div>
                    </div>

                    <div class="branding">Year in Review {period_name}</div>
                </div>

                <div class="card-right">
                    <div class="mini-calendar">
                        {mini_calendar}
                    </div>
                </div>
            </div>
        </section>
    </div>
</body>
</html>"#,
        period_name = period.display_name(),
        style = STYLE,
        sources_text = escape_html(&sources_text),
        legend = legend_html(view),
        source_cards = source_cards_html(view),
        total_tokens = format_number_full(view.total_tokens),
        weeks = weeks_html(view, &calendar, period.year()),
        total_days = view.streaks.total_days,
        longest = view.streaks.longest_streak,
        current = view.streaks.current_streak,
        calendar = calendar_html(view, &calendar, period),
        days_ago = days_ago,
        models = models_html(view),
        sessions = view.total_sessions,
        messages = view.total_messages,
        tokens_short = format_number(view.total_tokens),
        longest_session = longest_session,
        mini_calendar = mini_calendar_html(view, &calendar, period),
    )
}

/// Dot color for a day: the source's color, a gradient across several
/// sources, or the inactive color.
fn day_color(view: &AggregatedView, calendar: &ActivityCalendar, date: NaiveDate) -> String {
    let Some(day) = calendar.day(date) else {
        return INACTIVE.to_string();
    };

    let colors: Vec<&str> = day
        .sources
        .iter()
        .map(|s| view.source_colors.color_or_default(s))
        .collect();

    match colors.as_slice() {
        [] => INACTIVE.to_string(),
        [single] => single.to_string(),
        many => format!("linear-gradient(135deg, {})", many.join(", ")),
    }
}

fn calendar_html(
    view: &AggregatedView,
    calendar: &ActivityCalendar,
    period: ReportPeriod,
) -> String {
    let mut html = String::new();

    for bucket in calendar.monthly_rollup(period.year()) {
        let mut dots = String::new();
        for date in ReportPeriod::Month(period.year(), bucket.month).dates() {
            let (events, sources) = match calendar.day(date) {
                Some(day) => (
                    day.events,
                    day.sources.iter().cloned().collect::<Vec<_>>().join(", "),
                ),
                None => (0, "none".to_string()),
            };
            let _ = write!(
                dots,
                r#"<div class="dot" style="background: {};" title="{}: {} events ({})"></div>"#,
                day_color(view, calendar, date),
                date,
                events,
                escape_html(&sources)
            );
        }

        let name = month_name(bucket.month);
        let _ = write!(
            html,
            r#"
        <div class="month">
            <div class="month-label" title="{} events in {}">{}<span class="month-days">{}d</span></div>
            <div class="month-dots">{}</div>
        </div>"#,
            bucket.events,
            name,
            &name[..3],
            bucket.active_days,
            dots
        );
    }

    html
}

fn mini_calendar_html(
    view: &AggregatedView,
    calendar: &ActivityCalendar,
    period: ReportPeriod,
) -> String {
    let mut html = String::new();

    for month in 1..=12 {
        html.push_str(r#"<div class="mini-month">"#);
        for date in ReportPeriod::Month(period.year(), month).dates() {
            // One color per dot: the alphabetically first source of the day
            let color = calendar
                .day(date)
                .and_then(|day| day.sources.iter().next())
                .map(|s| view.source_colors.color_or_default(s).to_string())
                .unwrap_or_else(|| INACTIVE.to_string());
            let _ = write!(
                html,
                r#"<div class="mini-dot" style="background: {};"></div>"#,
                color
            );
        }
        html.push_str("</div>");
    }

    html
}

fn weeks_html(view: &AggregatedView, calendar: &ActivityCalendar, year: i32) -> String {
    let weeks = calendar.weekly_rollup(year, view.total_tokens, view.events.len() as u64);
    let max_tokens = weeks
        .iter()
        .map(|w| w.estimated_tokens)
        .max()
        .filter(|&m| m > 0)
        .unwrap_or(1);

    let mut html = String::new();
    for week in &weeks {
        let tokens = week.estimated_tokens;
        let opacity = if tokens == 0 {
            0.15
        } else {
            0.3 + (tokens as f64 / max_tokens as f64) * 0.7
        };
        let label = if tokens > 0 {
            format_number(tokens)
        } else {
            String::new()
        };
        let _ = write!(
            html,
            r#"
        <div class="week" style="opacity: {:.2};">
            <div class="week-label">Week {}</div>
            <div class="week-tokens">{}</div>
        </div>"#,
            opacity, week.week, label
        );
    }

    html
}

fn models_html(view: &AggregatedView) -> String {
    let models = view.models_by_tokens();
    if models.is_empty() {
        return r#"<div class="model-item"><span class="model-rank">-</span> <span class="model-name">No data</span></div>"#
            .to_string();
    }

    let mut html = String::new();
    for (rank, (name, _)) in models.iter().take(TOP_MODELS).enumerate() {
        let _ = write!(
            html,
            r#"<div class="model-item"><span class="model-rank">{}</span> <span class="model-name">{}</span></div>"#,
            rank + 1,
            escape_html(&display_model_name(name))
        );
    }
    html
}

fn legend_html(view: &AggregatedView) -> String {
    let mut html = String::new();
    for source in &view.sources {
        let label: String = if source.chars().count() > LEGEND_LABEL_CHARS {
            let head: String = source.chars().take(LEGEND_LABEL_CHARS - 3).collect();
            format!("{}...", head)
        } else {
            source.clone()
        };
        let _ = write!(
            html,
            r#"<div class="legend-item"><div class="legend-dot" style="background: {};"></div><span>{}</span></div>"#,
            view.source_colors.color_or_default(source),
            escape_html(&label)
        );
    }
    html
}

fn source_cards_html(view: &AggregatedView) -> String {
    let mut html = String::new();
    for source in &view.sources {
        let color = view.source_colors.color_or_default(source);
        let stats = view.per_source_stats.get(source).copied().unwrap_or_default();
        let _ = write!(
            html,
            r#"
        <div class="host-stat-card" style="border-left: 4px solid {color};">
            <div class="host-name" style="color: {color};">{name}</div>
            <div class="host-stats-grid">
                <div><span class="host-stat-value">{tokens}</span><span class="host-stat-label">tokens</span></div>
                <div><span class="host-stat-value">{days}</span><span class="host-stat-label">days</span></div>
                <div><span class="host-stat-value">{sessions}</span><span class="host-stat-label">sessions</span></div>
                <div><span class="host-stat-value">{events}</span><span class="host-stat-label">events</span></div>
            </div>
        </div>"#,
            color = color,
            name = escape_html(&truncate_label(source)),
            tokens = format_number(stats.tokens),
            days = stats.days,
            sessions = stats.sessions,
            events = stats.events,
        );
    }
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
