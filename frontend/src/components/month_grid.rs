use shared::calendar::WEEKDAY_LABELS;
use shared::grid::{Cell, MonthGrid as Grid};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MonthGridProps {
    pub grid: Grid,
    pub on_previous: Callback<MouseEvent>,
    pub on_next: Callback<MouseEvent>,
}

#[function_component(MonthGrid)]
pub fn month_grid(props: &MonthGridProps) -> Html {
    let cells = props.grid.cells().enumerate().map(|(index, cell)| match cell {
        Cell::Blank => html! {
            <div key={format!("blank-{}", index)} class="day-cell blank"></div>
        },
        Cell::Day(day) => html! {
            <div
                key={day.date.clone()}
                class={classes!("day-cell", day.has_event().then_some("has-event"))}
            >
                <span class="day-number">{ day.day }</span>
                { for day.events.iter().map(|event| html! {
                    <div key={event.id.to_string()} class="event-label">{ event.label() }</div>
                })}
            </div>
        },
    });

    html! {
        <section class="month">
            <div class="month-header">
                <button class="nav-btn" onclick={props.on_previous.clone()}>{ "<" }</button>
                <h2>{ props.grid.cursor.to_string() }</h2>
                <button class="nav-btn" onclick={props.on_next.clone()}>{ ">" }</button>
            </div>
            <div class="weekdays">
                { for WEEKDAY_LABELS.iter().map(|label| html! {
                    <div key={*label} class="weekday">{ *label }</div>
                })}
            </div>
            <div class="days">
                { for cells }
            </div>
        </section>
    }
}
