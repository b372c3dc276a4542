use monthplan_core::filter::{
  FilterCriteria,
  TimeWindow
};
use monthplan_core::task::Category;
use web_sys::{
  Event,
  HtmlInputElement,
  InputEvent,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct FilterPanelProps {
  pub criteria:  FilterCriteria,
  pub on_change: Callback<FilterCriteria>
}

#[function_component(FilterPanel)]
pub fn filter_panel(
  props: &FilterPanelProps
) -> Html {
  let category_toggle =
    |category: Category| {
      let criteria = props.criteria.clone();
      let on_change = props.on_change.clone();
      Callback::from(move |e: Event| {
        let Some(input) = e
          .target_dyn_into::<HtmlInputElement>(
          )
        else {
          tracing::warn!(
            "category filter event had \
             non-input target"
          );
          return;
        };
        let mut next = criteria.clone();
        next.toggle_category(
          category,
          input.checked()
        );
        on_change.emit(next);
      })
    };

  // "all" is not a window key, so it
  // clears the window.
  let on_window_change = {
    let criteria = props.criteria.clone();
    let on_change = props.on_change.clone();
    Callback::from(move |e: Event| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      let mut next = criteria.clone();
      next.time_window =
        TimeWindow::from_key(&input.value());
      on_change.emit(next);
    })
  };

  let on_search_input = {
    let criteria = props.criteria.clone();
    let on_change = props.on_change.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      let mut next = criteria.clone();
      next.search_term = input.value();
      on_change.emit(next);
    })
  };

  let on_clear = {
    let on_change = props.on_change.clone();
    Callback::from(move |_: MouseEvent| {
      on_change.emit(FilterCriteria::default());
    })
  };

  html! {
      <div class="panel filter-panel">
          <div class="header">{ "Filters" }</div>
          <div class="filter-section">
              <div class="filter-title">{ "Categories" }</div>
              {
                  for Category::ALL.into_iter().map(|category| {
                      let checked = props.criteria.categories.contains(&category);
                      let swatch = format!("background-color:{};", category.color());
                      html! {
                          <label class="filter-option">
                              <input
                                  type="checkbox"
                                  checked={checked}
                                  onchange={category_toggle(category)}
                              />
                              <span class="category-swatch" style={swatch}></span>
                              <span>{ category.label() }</span>
                          </label>
                      }
                  })
              }
          </div>
          <div class="filter-section">
              <div class="filter-title">{ "Time window" }</div>
              <label class="filter-option">
                  <input
                      type="radio"
                      name="time-window"
                      value="all"
                      checked={props.criteria.time_window.is_none()}
                      onchange={on_window_change.clone()}
                  />
                  <span>{ "All tasks" }</span>
              </label>
              {
                  for TimeWindow::ALL.into_iter().map(|window| html! {
                      <label class="filter-option">
                          <input
                              type="radio"
                              name="time-window"
                              value={window.key()}
                              checked={props.criteria.time_window == Some(window)}
                              onchange={on_window_change.clone()}
                          />
                          <span>{ window.label() }</span>
                      </label>
                  })
              }
          </div>
          <div class="filter-section">
              <div class="filter-title">{ "Search" }</div>
              <input
                  class="filter-search"
                  type="search"
                  placeholder="Task name"
                  value={props.criteria.search_term.clone()}
                  oninput={on_search_input}
              />
          </div>
          {
              if props.criteria.is_active() {
                  html! { <button type="button" class="btn" onclick={on_clear}>{ "Clear All Filters" }</button> }
              } else {
                  html! {}
              }
          }
      </div>
  }
}
