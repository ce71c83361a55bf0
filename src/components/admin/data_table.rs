use leptos::*;

/// One rendered row: the entity id plus pre-formatted cell text.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<String>,
}

/// The shared back-office table. Every admin tab feeds it formatted rows
/// and hooks the edit/delete actions.
#[component]
pub fn DataTable(
    headers: Vec<&'static str>,
    rows: Signal<Vec<TableRow>>,
    #[prop(optional, into)] on_edit: Option<Callback<i64>>,
    #[prop(optional, into)] on_delete: Option<Callback<i64>>,
) -> impl IntoView {
    let has_actions = on_edit.is_some() || on_delete.is_some();
    view! {
        <table class="data-table">
            <thead>
                <tr>
                    {headers.iter().map(|h| view! { <th>{ *h }</th> }).collect::<Vec<_>>()}
                    {has_actions.then(|| view! { <th>{ "Actions" }</th> })}
                </tr>
            </thead>
            <tbody>
                {move || rows.get().into_iter().map(|row| {
                    let id = row.id;
                    view! {
                        <tr>
                            {row.cells.iter().map(|cell| view! {
                                <td>{ cell.clone() }</td>
                            }).collect::<Vec<_>>()}
                            {has_actions.then(|| view! {
                                <td class="actions">
                                    {on_edit.map(|cb| view! {
                                        <button on:click=move |_| cb.call(id)>{ "Edit" }</button>
                                    })}
                                    {on_delete.map(|cb| view! {
                                        <button class="danger" on:click=move |_| cb.call(id)>
                                            { "Delete" }
                                        </button>
                                    })}
                                </td>
                            })}
                        </tr>
                    }
                }).collect::<Vec<_>>()}
            </tbody>
        </table>
    }
}

/// Modal wrapper for the create/edit forms. Visibility is owned by the
/// calling tab.
#[component]
pub fn Modal(title: String, open: RwSignal<bool>, children: Children) -> impl IntoView {
    view! {
        <div class="modal-backdrop" style:display={move || if open.get() { "flex" } else { "none" }}>
            <div class="modal">
                <div class="modal-header">
                    <h3>{ title }</h3>
                    <button on:click=move |_| open.set(false)>{ "X" }</button>
                </div>
                <div class="modal-body">{ children() }</div>
            </div>
        </div>
    }
}
