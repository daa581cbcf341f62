use yew::prelude::*;
use yew_router::prelude::*;

use crate::router::Route;
use crate::services::auth::{clear_session, load_session};

#[function_component(Header)]
pub fn header() -> Html {
    // Re-render on navigation so the session shown stays current.
    let _route = use_route::<Route>();
    let navigator = use_navigator();
    let session = load_session();

    let on_sign_out = Callback::from(move |_: MouseEvent| {
        clear_session();
        tracing::info!("Signed out");
        if let Some(navigator) = &navigator {
            navigator.push(&Route::SignIn);
        }
    });

    html! {
        <header class="header">
            <div class="container">
                <h1>{ "Daybook" }</h1>
                <nav>
                    <Link<Route> to={Route::Calendar}>{ "Calendar" }</Link<Route>>
                    { " | " }
                    {match session {
                        Some(session) => html! {
                            <>
                                <span class="user-name">
                                    { session.display_name.unwrap_or_else(|| "Anonymous".to_string()) }
                                </span>
                                <button class="btn btn-link" onclick={on_sign_out}>{ "Sign out" }</button>
                            </>
                        },
                        None => html! {
                            <Link<Route> to={Route::SignIn}>{ "Sign in" }</Link<Route>>
                        },
                    }}
                </nav>
            </div>
        </header>
    }
}
