use monthplan_core::interaction::ResizeEdge;
use monthplan_core::layout::Placement;
use monthplan_core::task::Task;
use web_sys::{
  DragEvent,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskBarProps {
  pub placement:       Placement,
  pub task:            Task,
  pub bar_height:      f64,
  pub is_dragging:     bool,
  pub on_drag_start:   Callback<String>,
  pub on_drag_end:     Callback<()>,
  pub on_resize_start:
    Callback<(String, ResizeEdge)>,
  pub on_click:        Callback<String>,
  pub on_delete:       Callback<String>
}

fn bar_style(
  placement: &Placement,
  bar_height: f64,
  color: &str
) -> String {
  format!(
    "left:{:.4}%;width:{:.4}%;top:{}px;\
     height:{}px;z-index:{};\
     background-color:{};",
    placement.left_pct,
    placement.width_pct,
    placement.top_px,
    bar_height,
    placement.z_index,
    color
  )
}

#[function_component(TaskBar)]
pub fn task_bar(
  props: &TaskBarProps
) -> Html {
  let task_id = props.task.id.clone();

  let ondragstart = {
    let on_drag_start =
      props.on_drag_start.clone();
    let task_id = task_id.clone();
    Callback::from(
      move |event: DragEvent| {
        if let Some(data_transfer) =
          event.data_transfer()
        {
          let _ = data_transfer
            .set_data("text/plain", &task_id);
          data_transfer
            .set_effect_allowed("move");
        }
        on_drag_start.emit(task_id.clone());
      }
    )
  };

  let ondragend = {
    let on_drag_end =
      props.on_drag_end.clone();
    Callback::from(move |_: DragEvent| {
      on_drag_end.emit(());
    })
  };

  let onclick = {
    let on_click = props.on_click.clone();
    let task_id = task_id.clone();
    Callback::from(
      move |event: MouseEvent| {
        event.stop_propagation();
        on_click.emit(task_id.clone());
      }
    )
  };

  // Keeps a press on the bar from
  // starting a range selection.
  let onmousedown =
    Callback::from(|event: MouseEvent| {
      event.stop_propagation();
    });

  let handle = |edge: ResizeEdge| {
    let on_resize_start =
      props.on_resize_start.clone();
    let task_id = task_id.clone();
    let class = match edge {
      | ResizeEdge::Left => {
        "task-bar-handle left"
      }
      | ResizeEdge::Right => {
        "task-bar-handle right"
      }
    };
    let onmousedown = Callback::from(
      move |event: MouseEvent| {
        // Suppresses the native drag of
        // the bar.
        event.prevent_default();
        event.stop_propagation();
        on_resize_start
          .emit((task_id.clone(), edge));
      }
    );
    let onclick =
      Callback::from(|event: MouseEvent| {
        event.stop_propagation();
      });
    html! {
        <div class={class} {onmousedown} {onclick}></div>
    }
  };

  let on_delete_click = {
    let on_delete = props.on_delete.clone();
    let task_id = task_id.clone();
    Callback::from(
      move |event: MouseEvent| {
        event.stop_propagation();
        on_delete.emit(task_id.clone());
      }
    )
  };

  let placement = &props.placement;
  let style = bar_style(
    placement,
    props.bar_height,
    props.task.color()
  );

  html! {
      <div
          class={classes!(
              "task-bar",
              props.is_dragging.then_some("dragging"),
              (!placement.starts_here).then_some("continues-left"),
              (!placement.ends_here).then_some("continues-right")
          )}
          style={style}
          title={props.task.name.clone()}
          draggable="true"
          {ondragstart}
          {ondragend}
          {onclick}
          {onmousedown}
      >
          { if placement.starts_here { handle(ResizeEdge::Left) } else { html! {} } }
          <span class="task-bar-name">{ &props.task.name }</span>
          {
              if placement.ends_here {
                  html! {
                      <>
                          <button type="button" class="task-bar-delete" title="Delete task" onclick={on_delete_click}>{ "×" }</button>
                          { handle(ResizeEdge::Right) }
                      </>
                  }
              } else {
                  html! {}
              }
          }
      </div>
  }
}
