use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::router::Route;
use crate::services::auth;

#[function_component(SignIn)]
pub fn sign_in() -> Html {
    let display_name = use_state(String::new);
    let error = use_state(|| None::<String>);
    let navigator = use_navigator();

    let on_name_input = {
        let display_name = display_name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            display_name.set(input.value());
        })
    };

    let on_submit = {
        let display_name = display_name.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let name = display_name.trim().to_string();
            let name = (!name.is_empty()).then_some(name);
            let error = error.clone();
            let navigator = navigator.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match auth::sign_in(name).await {
                    Ok(session) => {
                        tracing::info!(uid = %session.uid, "Signed in");
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Calendar);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to sign in: {}", e);
                        error.set(Some(e));
                    }
                }
            });
        })
    };

    html! {
        <div class="container">
            <div class="sign-in">
                <h2>{ "Sign in" }</h2>
                <p>{ "Start an anonymous session to keep your events." }</p>
                <form onsubmit={on_submit}>
                    <input
                        type="text"
                        placeholder="Display name (optional)"
                        value={(*display_name).clone()}
                        oninput={on_name_input}
                    />
                    <button type="submit" class="btn btn-primary">{ "Continue" }</button>
                </form>
                if let Some(err) = &*error {
                    <p class="error">{ err }</p>
                }
            </div>
        </div>
    }
}
