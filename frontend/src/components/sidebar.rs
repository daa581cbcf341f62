use shared::grid::MonthSummary;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SidebarProps {
    pub year: i32,
    pub months: Vec<MonthSummary>,
    /// Emits the 0-based month picked.
    pub on_select: Callback<u32>,
}

#[function_component(Sidebar)]
pub fn sidebar(props: &SidebarProps) -> Html {
    html! {
        <aside class="sidebar">
            <h2 class="sidebar-year">{ props.year }</h2>
            <ul class="month-list">
                { for props.months.iter().map(|summary| {
                    let month = summary.month;
                    let on_select = props.on_select.clone();
                    html! {
                        <li
                            key={summary.name}
                            class={classes!("month-item", summary.active.then_some("active"))}
                            onclick={Callback::from(move |_: MouseEvent| on_select.emit(month))}
                        >
                            <span class="month-name">{ summary.name }</span>
                            <span class="month-count">{ format!("({})", summary.count) }</span>
                        </li>
                    }
                })}
            </ul>
        </aside>
    }
}
