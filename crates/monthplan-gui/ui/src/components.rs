mod calendar_day;
mod calendar_grid;
mod filter_panel;
mod task_bar;
mod task_modal;

pub use calendar_day::CalendarDay;
pub use calendar_grid::{
  CalendarGrid,
  GridPointer
};
pub use filter_panel::FilterPanel;
pub use task_bar::TaskBar;
pub use task_modal::{
  ModalMode,
  ModalState,
  TaskModal
};
