use std::rc::Rc;

use shared::state::actions_after_create;
use shared::sync::{EventSync, SyncError};
use shared::{CalendarAction, CalendarState, Cursor, Event, EventId};
use yew::prelude::*;

use crate::components::event_panel::EventPanel;
use crate::components::month_grid::MonthGrid;
use crate::components::sidebar::Sidebar;
use crate::services::api::HttpEventStore;
use crate::services::auth::SessionIdentity;
use crate::state::CalendarModel;

type CalendarSync = EventSync<HttpEventStore, SessionIdentity>;

fn log_sync_error(action: &str, error: &SyncError) {
    match error {
        SyncError::MissingIdentity => tracing::debug!("{} skipped: not signed in", action),
        SyncError::IncompleteDraft(_) => tracing::debug!("{} skipped: {}", action, error),
        SyncError::Store(_) => tracing::error!("Failed to {}: {}", action, error),
        SyncError::Refresh(_) => tracing::warn!("After {}: {}", action, error),
    }
}

#[function_component(Calendar)]
pub fn calendar() -> Html {
    let model = use_reducer(|| CalendarModel(CalendarState::new(Cursor::today())));
    let sync: Rc<CalendarSync> =
        use_memo((), |_| EventSync::new(HttpEventStore, SessionIdentity));

    // One subscription per mounted page, released on unmount.
    {
        let sync = sync.clone();
        let dispatcher = model.dispatcher();
        use_effect_with((), move |_| {
            let subscription = match sync.subscribe(move |events: Vec<Event>| {
                dispatcher.dispatch(CalendarAction::ReplaceEvents(events));
            }) {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    log_sync_error("subscribe", &e);
                    None
                }
            };
            move || drop(subscription)
        });
    }

    let dispatch = |action: fn(String) -> CalendarAction| {
        let model = model.clone();
        Callback::from(move |value: String| model.dispatch(action(value)))
    };
    let on_date = dispatch(CalendarAction::SetDraftDate);
    let on_time = dispatch(CalendarAction::SetDraftTime);
    let on_title = dispatch(CalendarAction::SetDraftTitle);

    let on_previous = {
        let model = model.clone();
        Callback::from(move |_: MouseEvent| model.dispatch(CalendarAction::PreviousMonth))
    };
    let on_next = {
        let model = model.clone();
        Callback::from(move |_: MouseEvent| model.dispatch(CalendarAction::NextMonth))
    };
    let on_select = {
        let model = model.clone();
        Callback::from(move |month: u32| model.dispatch(CalendarAction::SelectMonth(month)))
    };

    let on_add = {
        let model = model.clone();
        let sync = sync.clone();
        Callback::from(move |_: ()| {
            let draft = model.0.draft.clone();
            let dispatcher = model.dispatcher();
            let sync = sync.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = sync.create(&draft).await;
                for action in actions_after_create(&result) {
                    dispatcher.dispatch(action);
                }
                if let Err(e) = result {
                    log_sync_error("add event", &e);
                }
            });
        })
    };

    let on_remove = {
        let model = model.clone();
        let sync = sync.clone();
        Callback::from(move |id: EventId| {
            let dispatcher = model.dispatcher();
            let sync = sync.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match sync.remove(&id).await {
                    Ok(events) => dispatcher.dispatch(CalendarAction::ReplaceEvents(events)),
                    Err(e) => log_sync_error("remove event", &e),
                }
            });
        })
    };

    let state = &model.0;
    let grid = state.grid();
    let month_events: Vec<Event> = grid.events().cloned().collect();

    html! {
        <div class="calendar">
            <Sidebar
                year={state.cursor.year()}
                months={state.sidebar()}
                on_select={on_select}
            />
            <MonthGrid grid={grid} on_previous={on_previous} on_next={on_next} />
            <EventPanel
                draft={state.draft.clone()}
                events={month_events}
                on_date={on_date}
                on_time={on_time}
                on_title={on_title}
                on_add={on_add}
                on_remove={on_remove}
            />
        </div>
    }
}
