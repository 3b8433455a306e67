//! ヘッダーコンポーネント（ログイン/ログアウト）

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::WebClient;
use crate::auth::{api_base_url, Session};

#[component]
pub fn Header(session: RwSignal<Session>) -> impl IntoView {
    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (busy, set_busy) = signal(false);

    let on_login = move |_| {
        let user = username.get_untracked();
        let pass = password.get_untracked();
        set_busy.set(true);
        spawn_local(async move {
            let client = WebClient::new(&api_base_url(), None);
            match client.login(&user, &pass).await {
                Ok(s) => {
                    s.store();
                    session.set(s);
                    set_password.set(String::new());
                }
                Err(e) => gloo::dialogs::alert(&format!("Login failed: {}", e)),
            }
            set_busy.set(false);
        });
    };

    let on_logout = move |_| {
        Session::clear();
        session.set(Session::default());
    };

    view! {
        <header class="header no-pdf">
            <h1>"FlareNet"</h1>
            <Show
                when=move || session.with(Session::is_logged_in)
                fallback=move || view! {
                    <div>
                        <input
                            placeholder="Username"
                            prop:value=move || username.get()
                            on:input=move |ev| set_username.set(event_target_value(&ev))
                        />
                        <input
                            type="password"
                            placeholder="Password"
                            prop:value=move || password.get()
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                        />
                        <button class="btn btn-primary" disabled=move || busy.get() on:click=on_login>
                            "Log in"
                        </button>
                    </div>
                }
            >
                <div>
                    <span>
                        {move || session.with(|s| format!(
                            "{} ({})",
                            s.username.clone().unwrap_or_default(),
                            s.role.clone().unwrap_or_default()
                        ))}
                    </span>
                    " "
                    <button class="btn" on:click=on_logout>"Log out"</button>
                </div>
            </Show>
        </header>
    }
}
