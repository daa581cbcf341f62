use std::rc::Rc;

use shared::{CalendarAction, CalendarState};
use yew::Reducible;

/// Calendar view state as held by `use_reducer`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarModel(pub CalendarState);

impl Reducible for CalendarModel {
    type Action = CalendarAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut state = self.0.clone();
        state.apply(action);
        Rc::new(Self(state))
    }
}
