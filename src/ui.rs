use crate::models::{StateResponse, UserCard};

pub fn render_index(state: &StateResponse) -> String {
    let body = if state.logged_in_user.is_some() {
        render_dashboard(state)
    } else {
        render_login(state.message.as_deref())
    };
    PAGE_HTML.replace("{{BODY}}", &body)
}

fn render_login(message: Option<&str>) -> String {
    LOGIN_HTML.replace("{{MESSAGE}}", &escape_html(message.unwrap_or_default()))
}

fn render_dashboard(state: &StateResponse) -> String {
    let cards: String = state.users.iter().map(render_card).collect();
    let cards = if cards.is_empty() {
        r#"<p class="empty">No users in the sheet yet.</p>"#.to_string()
    } else {
        cards
    };

    DASHBOARD_HTML
        .replace("{{ERROR}}", &banner("error", state.message.as_deref()))
        .replace("{{NOTICE}}", &banner("notice", state.notice.as_deref()))
        .replace("{{CARDS}}", &cards)
}

fn render_card(card: &UserCard) -> String {
    let name = escape_html(&card.username);
    let path = urlencoding::encode(&card.username);
    CARD_HTML
        .replace("{{ICON}}", &escape_html(&card.icon))
        .replace("{{PATH}}", &path)
        .replace("{{LOCAL}}", &card.local.to_string())
        .replace("{{GLOBAL}}", &card.global.to_string())
        .replace("{{TOTAL}}", &card.total.to_string())
        .replace("{{NAME}}", &name)
}

fn banner(kind: &str, text: Option<&str>) -> String {
    match text {
        Some(text) if !text.is_empty() => format!(
            r#"<div class="banner {kind}" role="alert">{}</div>"#,
            escape_html(text)
        ),
        _ => String::new(),
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Rewarding Life</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #2b2a28;
      --accent: #3f8f5b;
      --accent-2: #b5533c;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(43, 42, 40, 0.12);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    main {
      width: min(900px, 100%);
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    h1 { margin: 0; font-family: Georgia, serif; }

    .panel {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 14px;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 18px;
    }

    .user-card {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 20px;
      display: grid;
      gap: 12px;
    }

    .user-head { display: flex; gap: 12px; align-items: center; }
    .user-icon { width: 56px; height: 56px; border-radius: 50%; background: #eee; }
    .user-info h3 { margin: 0; }
    .user-info p { margin: 4px 0 0; }

    form.adjust {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 6px;
      border-top: 1px solid rgba(0, 0, 0, 0.06);
      padding-top: 10px;
    }

    form.adjust input[name="reason"], form.adjust button { grid-column: span 2; }

    input {
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid #ccc;
      font-size: 0.95rem;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.redeem { background: var(--accent-2); }
    button.plain { background: #5f5c57; }
    button:disabled { opacity: 0.6; cursor: wait; }

    .banner { border-radius: 12px; padding: 12px 16px; }
    .banner.error { background: #fde3de; color: #8a2c1b; }
    .banner.notice { background: #fff4d6; color: #6b5200; }
    .error-message { color: #8a2c1b; min-height: 1.2em; margin: 0; }
    .empty { color: #8b857d; }
  </style>
</head>
<body>
  <main>
{{BODY}}
  </main>
  <script>
    document.querySelectorAll('form').forEach((form) => {
      form.addEventListener('submit', () => {
        const button = form.querySelector('button[type="submit"]');
        if (button) {
          button.disabled = true;
          button.textContent = 'Processing...';
        }
      });
    });
  </script>
</body>
</html>
"#;

const LOGIN_HTML: &str = r#"    <header><h1>Rewarding Life</h1></header>
    <section class="panel" id="password-container">
      <form method="post" action="/login">
        <label for="password-input">Password</label>
        <input id="password-input" type="password" name="password" autocomplete="current-password" />
        <button id="submit-password" type="submit">Log in</button>
      </form>
      <p class="error-message" id="error-message">{{MESSAGE}}</p>
    </section>
"#;

const DASHBOARD_HTML: &str = r#"    <header>
      <h1>Rewarding Life</h1>
      <div>
        <form method="post" action="/refresh" style="display:inline"><button class="plain" type="submit">Refresh</button></form>
        <form method="post" action="/logout" style="display:inline"><button class="plain" id="logout-button" type="submit">Log out</button></form>
      </div>
    </header>
    {{ERROR}}
    {{NOTICE}}
    <section class="cards" id="user-cards-container">
{{CARDS}}
    </section>
"#;

const CARD_HTML: &str = r#"      <div class="user-card" data-username="{{NAME}}">
        <div class="user-head">
          <img src="{{ICON}}" alt="{{NAME}} icon" class="user-icon" />
          <div class="user-info">
            <h3>{{NAME}}</h3>
            <p>Local: {{LOCAL}}, Global: {{GLOBAL}}</p>
            <p><strong>Total: {{TOTAL}}</strong></p>
          </div>
        </div>
        <form class="adjust" method="post" action="/users/{{PATH}}/add">
          <input type="number" min="0" name="local" value="0" aria-label="Local points to add" />
          <input type="number" min="0" name="global" value="0" aria-label="Global points to add" />
          <input type="text" name="reason" placeholder="Reason" />
          <button type="submit">Add</button>
        </form>
        <form class="adjust" method="post" action="/users/{{PATH}}/redeem">
          <input type="number" min="0" name="local" value="0" aria-label="Local points to redeem" />
          <input type="number" min="0" name="global" value="0" aria-label="Global points to redeem" />
          <input type="text" name="reason" placeholder="Reason" />
          <button class="redeem" type="submit">Redeem</button>
        </form>
      </div>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str) -> UserCard {
        UserCard {
            username: name.into(),
            local: 10,
            global: 5,
            total: 15,
            icon: format!("/icons/{}.png", name.to_lowercase()),
        }
    }

    #[test]
    fn logged_out_shows_login_with_message() {
        let html = render_index(&StateResponse {
            view: "logged_out".into(),
            message: Some("Invalid password".into()),
            notice: None,
            logged_in_user: None,
            users: vec![],
        });
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains("Invalid password"));
        assert!(!html.contains("user-card"));
    }

    #[test]
    fn dashboard_renders_cards_and_totals() {
        let html = render_index(&StateResponse {
            view: "dashboard".into(),
            message: None,
            notice: Some("Please provide a reason.".into()),
            logged_in_user: Some("rose".into()),
            users: vec![card("Rose")],
        });
        assert!(html.contains("Local: 10, Global: 5"));
        assert!(html.contains("Total: 15"));
        assert!(html.contains("/icons/rose.png"));
        assert!(html.contains(r#"action="/users/Rose/redeem""#));
        assert!(html.contains("Please provide a reason."));
    }

    #[test]
    fn usernames_are_escaped() {
        let html = render_card(&card("<b>ann</b> & co"));
        assert!(html.contains("&lt;b&gt;ann&lt;/b&gt; &amp; co"));
        assert!(html.contains("/users/%3Cb%3Eann%3C%2Fb%3E%20%26%20co/add"));
    }

    #[test]
    fn names_with_spaces_get_working_links() {
        let html = render_card(&UserCard::from(&crate::models::User {
            username: "Mary Jane".into(),
            current_local_points: 1,
            current_global_points: 2,
        }));
        assert!(html.contains(r#"src="/icons/mary%20jane.png""#));
        assert!(html.contains(r#"action="/users/Mary%20Jane/add""#));
    }
}
