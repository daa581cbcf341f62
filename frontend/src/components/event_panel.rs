use shared::{Draft, Event, EventId};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct EventPanelProps {
    pub draft: Draft,
    /// Events of the displayed month.
    pub events: Vec<Event>,
    pub on_date: Callback<String>,
    pub on_time: Callback<String>,
    pub on_title: Callback<String>,
    pub on_add: Callback<()>,
    pub on_remove: Callback<EventId>,
}

fn input_value(callback: &Callback<String>) -> Callback<InputEvent> {
    callback.reform(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        input.value()
    })
}

#[function_component(EventPanel)]
pub fn event_panel(props: &EventPanelProps) -> Html {
    let on_submit = {
        let on_add = props.on_add.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_add.emit(());
        })
    };

    html! {
        <aside class="event-panel">
            <form class="event-form" onsubmit={on_submit}>
                <input
                    type="date"
                    value={props.draft.date.clone()}
                    oninput={input_value(&props.on_date)}
                />
                <input
                    type="time"
                    value={props.draft.time.clone()}
                    oninput={input_value(&props.on_time)}
                />
                <input
                    type="text"
                    placeholder="Event title"
                    value={props.draft.title.clone()}
                    oninput={input_value(&props.on_title)}
                />
                <button type="submit" class="btn btn-primary">{ "Add Event" }</button>
            </form>
            <ul class="event-list">
                if props.events.is_empty() {
                    <li class="empty-state">{ "No events this month" }</li>
                }
                { for props.events.iter().map(|event| {
                    let id = event.id.clone();
                    let on_remove = props.on_remove.clone();
                    html! {
                        <li key={event.id.to_string()} class="event-item">
                            <span class="event-date">{ event.date() }</span>
                            <span class="event-label">{ event.label() }</span>
                            <button
                                class="btn btn-remove"
                                onclick={Callback::from(move |_: MouseEvent| on_remove.emit(id.clone()))}
                            >
                                { "Remove" }
                            </button>
                        </li>
                    }
                })}
            </ul>
        </aside>
    }
}
