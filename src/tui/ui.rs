use std::borrow::Cow;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DemographicsRow, Screen};
use crate::models::{AgeGroup, Category, CategoryFilter, Field, Gender, Post, Side, VoteTally};

/// Card titles are clamped to this many wrapped lines.
const TITLE_CLAMP_LINES: usize = 2;

pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::List => draw_list_screen(frame, app),
        Screen::Detail => draw_detail_screen(frame, app),
        Screen::Write => draw_write_screen(frame, app),
    }

    if app.demographics.is_some() {
        render_demographics(frame, app);
    }

    if let Some(draft) = app.compose.as_ref().and_then(|c| c.found_draft()) {
        let saved = draft.saved_at.format("%Y-%m-%d %H:%M").to_string();
        render_draft_prompt(frame, &saved);
    }

    // Render help popup if active
    if app.show_help {
        render_help(frame);
    }
}

fn draw_list_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Search
            Constraint::Min(0),    // Post list
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_search(frame, app, chunks[1]);
    render_post_list(frame, app, chunks[2]);
    render_status(
        frame,
        app,
        chunks[3],
        "j/k:nav  Enter:open  c:category  s:sort  /:search  w:write  r:refresh  ?:help  q:quit",
    );
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Side Vote [{}] [{}] ",
        app.category.label(),
        app.sort.label()
    );
    let total_votes: u64 = app.posts.iter().map(Post::total_votes).sum();
    let stats = format!(" {} Stories | {} Votes", app.posts.len(), total_votes);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.search_active {
        (format!("> {}_", app.query), Style::default().fg(Color::White))
    } else if app.query.is_empty() {
        (
            "Search titles and stories...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (format!("> {}", app.query), Style::default().fg(Color::White))
    };

    let border = if app.search_active {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    frame.render_widget(Paragraph::new(text).style(style).block(block), area);
}

fn render_post_list(frame: &mut Frame, app: &App, area: Rect) {
    let posts = app.filtered_posts();

    if posts.is_empty() {
        let message = if !app.query.trim().is_empty() || app.category != CategoryFilter::All {
            "No matching stories."
        } else {
            "No stories yet. Press 'w' to write the first one."
        };
        let paragraph = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    // borders, highlight symbol, category tag and vote column
    let title_width = (area.width as usize).saturating_sub(30).max(10);

    let items: Vec<ListItem> = posts
        .iter()
        .map(|post| {
            let wrapped = textwrap::wrap(&post.title, title_width);
            let clamped = wrapped.len() > TITLE_CLAMP_LINES;
            let mut title_lines: Vec<String> = wrapped
                .into_iter()
                .take(TITLE_CLAMP_LINES)
                .map(Cow::into_owned)
                .collect();
            if clamped {
                if let Some(last) = title_lines.last_mut() {
                    last.push('…');
                }
            }
            let first = if title_lines.is_empty() {
                String::new()
            } else {
                title_lines.remove(0)
            };

            let mut lines = vec![Line::from(vec![
                Span::styled(
                    format!("[{:<6}] ", post.category.label()),
                    Style::default().fg(Color::Blue),
                ),
                Span::styled(first, Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {} votes", post.total_votes()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])];
            lines.extend(title_lines.into_iter().map(|l| {
                Line::from(Span::styled(
                    format!("         {l}"),
                    Style::default().fg(Color::White),
                ))
            }));

            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail_screen(frame: &mut Frame, app: &App) {
    let Some(session) = app.vote.as_ref() else {
        return;
    };
    let post = session.post();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Min(5),     // Story
            Constraint::Length(10), // Vote section
            Constraint::Length(1),  // Status line
        ])
        .split(frame.area());

    let header = format!(
        " {} | {} votes ",
        post.category.label(),
        post.total_votes()
    );
    let title_block = Block::default()
        .title(header)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let title = Paragraph::new(post.title.as_str())
        .block(title_block)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    frame.render_widget(title, chunks[0]);

    let story_block = Block::default()
        .title(" Story ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let story = Paragraph::new(post.story.as_str())
        .block(story_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(story, chunks[1]);

    if session.has_voted() {
        let layout = if chunks[2].height < 8 {
            ResultLayout::Compact
        } else {
            ResultLayout::Expanded
        };
        render_vote_result(frame, post, chunks[2], layout);
    } else {
        render_vote_buttons(frame, post, chunks[2]);
    }

    render_status(
        frame,
        app,
        chunks[3],
        "a/b:vote  y:copy link  t:share on X  k:share on Kakao  w:write  Esc:back  q:quit",
    );
}

fn render_vote_buttons(frame: &mut Frame, post: &Post, area: Rect) {
    let block = Block::default()
        .title(" Whose side are you on? ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" [a] ", Style::default().fg(Color::Blue)),
            Span::styled(
                post.side_a_label.as_str(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(" [b] ", Style::default().fg(Color::Red)),
            Span::styled(
                post.side_b_label.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " You can only vote once",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultLayout {
    Compact,
    Expanded,
}

fn render_vote_result(frame: &mut Frame, post: &Post, area: Rect, layout: ResultLayout) {
    let tally = post.tally();
    let block = Block::default()
        .title(" Results ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if layout == ResultLayout::Compact {
        let line = Line::from(vec![
            Span::styled(
                format!("{} {}%", post.side_a_label, tally.percentage_a),
                Style::default().fg(Color::Blue),
            ),
            Span::raw("  vs  "),
            Span::styled(
                format!("{}% {}", tally.percentage_b, post.side_b_label),
                Style::default().fg(Color::Red),
            ),
            Span::styled(
                format!("  ({} total)", tally.total),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // A label
            Constraint::Length(1), // A bar
            Constraint::Length(1),
            Constraint::Length(1), // B label
            Constraint::Length(1), // B bar
            Constraint::Min(0),    // Total
        ])
        .split(inner);

    let bars = [
        (post.side_label(Side::A), tally.votes_a, tally.percentage_a, Color::Blue, 0),
        (post.side_label(Side::B), tally.votes_b, tally.percentage_b, Color::Red, 3),
    ];
    for (label, votes, percentage, color, row) in bars {
        let heading = Line::from(vec![
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {percentage}%"), Style::default().fg(color)),
        ]);
        frame.render_widget(Paragraph::new(heading), rows[row]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .percent(u16::from(percentage.min(100)))
            .label(format!("{votes} votes"));
        frame.render_widget(gauge, rows[row + 1]);
    }

    frame.render_widget(
        Paragraph::new(total_line(&tally)).style(Style::default().fg(Color::DarkGray)),
        rows[5],
    );
}

fn total_line(tally: &VoteTally) -> String {
    format!("{} people took part", tally.total)
}

fn draw_write_screen(frame: &mut Frame, app: &App) {
    let Some(compose) = app.compose.as_ref() else {
        return;
    };
    let form = compose.form();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Category
            Constraint::Min(6),    // Story
            Constraint::Length(3), // Side labels
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    let sides = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(chunks[3]);

    let focused = app.compose_field;
    render_text_field(frame, Field::Title, &form.title, focused, chunks[0]);

    let category_line = Category::ALL
        .iter()
        .map(|c| {
            let style = if *c == form.category {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!(" {} ", c.label()), style)
        })
        .collect::<Vec<_>>();
    let category_block = field_block(Field::Category, None, focused);
    frame.render_widget(
        Paragraph::new(Line::from(category_line)).block(category_block),
        chunks[1],
    );

    render_text_field(frame, Field::Story, &form.story, focused, chunks[2]);
    render_text_field(frame, Field::SideALabel, &form.side_a_label, focused, sides[0]);
    render_text_field(frame, Field::SideBLabel, &form.side_b_label, focused, sides[1]);

    render_status(
        frame,
        app,
        chunks[4],
        "Tab:next field  Ctrl+S:post  Esc:cancel  (drafts are saved automatically)",
    );
}

fn render_text_field(frame: &mut Frame, field: Field, value: &str, focused: Field, area: Rect) {
    let counter = field
        .max_len()
        .map(|max| format!(" {}/{} ", value.chars().count(), max));
    let block = field_block(field, counter, focused);

    let text = if field == focused {
        format!("{value}_")
    } else {
        value.to_string()
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn field_block(field: Field, counter: Option<String>, focused: Field) -> Block<'static> {
    let color = if field == focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let mut block = Block::default()
        .title(format!(" {} * ", field.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    if let Some(counter) = counter {
        block = block.title_bottom(Line::from(counter).right_aligned());
    }
    block
}

fn render_status(frame: &mut Frame, app: &App, area: Rect, hints: &str) {
    let (text, style) = match &app.status {
        Some(message) => (message.as_str(), Style::default().fg(Color::Yellow)),
        None => (hints, Style::default().fg(Color::DarkGray)),
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_demographics(frame: &mut Frame, app: &App) {
    let Some(form) = app.demographics.as_ref() else {
        return;
    };
    let area = centered_rect(60, 40, frame.area());

    let pending = app
        .vote
        .as_ref()
        .and_then(|v| v.pending_side().map(|side| v.post().side_label(side)));
    let title = match pending {
        Some(label) => format!(" Before you vote for {label} "),
        None => " Before you vote ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let gender_row = options_line(
        "Gender",
        Gender::ALL.iter().map(|g| (g.label(), form.gender == Some(*g))),
        app.demographics_row == DemographicsRow::Gender,
    );
    let age_row = options_line(
        "Age",
        AgeGroup::ALL
            .iter()
            .map(|a| (a.label(), form.age_group == Some(*a))),
        app.demographics_row == DemographicsRow::AgeGroup,
    );

    let lines = vec![
        Line::from(" Tell us a little about yourself for the statistics."),
        Line::from(" You only need to do this once."),
        Line::from(""),
        gender_row,
        Line::from(""),
        age_row,
        Line::from(""),
        Line::from(Span::styled(
            " ←/→ choose  ↑/↓ switch row  Enter vote  Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn options_line<'a>(
    label: &'a str,
    options: impl Iterator<Item = (&'a str, bool)>,
    active: bool,
) -> Line<'a> {
    let label_style = if active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![Span::styled(format!(" {label:<7}"), label_style)];
    for (name, selected) in options {
        let style = if selected {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {name} "), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_draft_prompt(frame: &mut Frame, saved_at: &str) {
    let area = centered_rect(50, 20, frame.area());

    let block = Block::default()
        .title(" Unsaved draft ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let text = format!(
        " You have a draft saved at {saved_at}.\n Restore it? (y = restore, n = discard)"
    );

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " List:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   Enter    Open story",
        "   c        Cycle category",
        "   s        Latest / popular",
        "   /        Search",
        "   r        Refresh",
        "",
        " Story:",
        "   a / b    Vote for a side",
        "   y        Show link",
        "   t        Share on X",
        "   k        Share on KakaoStory",
        "   Esc      Back to list",
        "",
        " General:",
        "   w        Write a story",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
