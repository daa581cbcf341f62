use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::{calendar::Calendar, not_found::NotFound, sign_in::SignIn};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Calendar,
    #[at("/signin")]
    SignIn,
    #[not_found]
    #[at("/404")]
    NotFound,
}

pub fn switch(routes: Route) -> Html {
    match routes {
        Route::Calendar => html! { <Calendar /> },
        Route::SignIn => html! { <SignIn /> },
        Route::NotFound => html! { <NotFound /> },
    }
}
