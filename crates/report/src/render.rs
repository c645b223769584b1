// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Report renderer: one standalone HTML document.
//!
//! Everything the document needs is inline: styles, the client-side
//! filter/sort script, and the row data itself. The renderer only decides
//! the initial presentation; the canonical row order was fixed by the
//! reducer, and the script reorders already-rendered rows without touching
//! any server.
//!
//! Every piece of user-supplied text (titles, descriptions, tags, field
//! values, file names) goes through [`escape_html`] before it is embedded.
//! That is a safety invariant, not cosmetics.

use benchboard_core::{date, BenchmarkDefinition, FieldValue, ResultRecord};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

/// Escape the five markup-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Column label from a field name: underscores to spaces, words title-cased.
pub fn humanize(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display commits truncated to this many characters; sorting still uses
/// the full value.
const COMMIT_DISPLAY_LEN: usize = 8;

/// Inputs the renderer needs beyond the records themselves.
#[derive(Debug)]
pub struct ReportInputs<'a> {
    /// Benchmark definitions, keyed and ordered by name.
    pub registry: &'a BTreeMap<String, BenchmarkDefinition>,
    /// Deduplicated, ordered records per test.
    pub reduced: &'a BTreeMap<String, Vec<ResultRecord>>,
    /// Code name → project URL.
    pub code_urls: &'a BTreeMap<String, String>,
    /// Href prefix of the results tree relative to the document,
    /// e.g. `../results`.
    pub results_href: &'a str,
    /// File name of the logo asset copied beside the document.
    pub logo: &'a str,
}

const STYLE: &str = r#":root{--bg:#ffffff;--fg:#111;--muted:#666;--card:#f6f6f7;--border:#e5e5e5;--link:#0b63c6;--chip:#e9eef5;}
[data-theme=dark]{--bg:#0f1116;--fg:#e6e6e6;--muted:#9aa0a6;--card:#171a21;--border:#2a2f3a;--link:#66a7ff;--chip:#1f2633;}
html,body{height:100%;} body{background:var(--bg);color:var(--fg);font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Noto Sans,Helvetica,Arial,sans-serif; margin:0;}
.container{max-width:1200px;margin:0 auto;padding:24px;}
.topbar{position:sticky;top:0;z-index:10;background:var(--bg);border-bottom:1px solid var(--border);}
.topbar-inner{display:flex;align-items:center;gap:16px;justify-content:space-between;max-width:1200px;margin:0 auto;padding:12px 24px;}
.brand{display:flex;align-items:center;gap:12px;} .brand h1{font-size:20px;margin:0;} .brand img{height:32px;width:auto;} .muted{color:var(--muted);}
.controls{display:flex;gap:12px;align-items:center;flex-wrap:wrap;}
.search{padding:8px 10px;border:1px solid var(--border);border-radius:8px;background:var(--bg);color:var(--fg);min-width:360px;}
.btn{padding:8px 10px;border:1px solid var(--border);border-radius:8px;background:var(--card);color:var(--fg);cursor:pointer;} .btn:hover{filter:brightness(0.98);}
th.sortable{cursor:pointer;user-select:none;} th.sort-asc::after{content:' \25B2';color:var(--muted);font-size:0.85em;} th.sort-desc::after{content:' \25BC';color:var(--muted);font-size:0.85em;}
.icon-btn{width:40px;height:36px;display:flex;align-items:center;justify-content:center;padding:0;}
.icon-btn svg{width:18px;height:18px;stroke:var(--fg);fill:none;stroke-width:2;stroke-linecap:round;stroke-linejoin:round;}
.icon-btn .moon{display:none;}
[data-theme=dark] .icon-btn .sun{display:none;}
[data-theme=dark] .icon-btn .moon{display:inline;}
.link-icon{display:inline-flex;align-items:center;justify-content:center;width:28px;height:28px;border:1px solid var(--border);border-radius:8px;background:var(--card);}
.link-icon:hover{filter:brightness(0.98);}
.link-icon svg{width:16px;height:16px;stroke:var(--fg);fill:none;stroke-width:2;stroke-linecap:round;stroke-linejoin:round;}
a{color:var(--link);} a:hover{text-decoration:none;filter:brightness(1.1);}
.stats{display:grid;grid-template-columns:repeat(auto-fit,minmax(160px,1fr));gap:12px;margin:16px 0 24px;}
.card{background:var(--card);border:1px solid var(--border);border-radius:12px;padding:14px;} .card .label{font-size:12px;color:var(--muted);} .card .value{font-weight:600;font-size:20px;}
.layout{display:grid;grid-template-columns:220px 1fr;gap:24px;} @media(max-width:1000px){.layout{grid-template-columns:1fr;}}
.sidebar{position:sticky;top:64px;align-self:start;background:var(--card);border:1px solid var(--border);border-radius:12px;padding:12px;}
.sidebar h3{margin:6px 8px;font-size:14px;color:var(--muted);} .nav{list-style:none;margin:0;padding:0;} .nav a{display:block;padding:8px 10px;border-radius:8px;color:var(--fg);} .nav a:hover{background:rgba(0,0,0,0.04);} [data-theme=dark] .nav a:hover{background:rgba(255,255,255,0.06);}
.test-header{display:flex;align-items:baseline;gap:12px;margin-top:28px;} .nowrap{white-space:nowrap;} .small{font-size:12px;color:var(--muted);}
.chip{display:inline-block;padding:2px 8px;border:1px solid var(--border);border-radius:999px;margin-right:6px;font-size:12px;background:var(--chip);}
table{border-collapse:collapse;width:100%;margin:12px 0 32px;} th,td{border:1px solid var(--border);padding:10px;text-align:left;} th{background:var(--card);position:sticky;top:48px;z-index:1;}
.best{background:linear-gradient(90deg,rgba(255,215,0,0.18),transparent);}
.footer{margin:32px 0;color:var(--muted);}"#;

const SCRIPT: &str = r#"(function(){
  const stored=localStorage.getItem('bb_theme');
  if(stored){document.documentElement.setAttribute('data-theme',stored);}
})();
function toggleTheme(){
  const cur=document.documentElement.getAttribute('data-theme');
  const next=cur==='dark'?'light':'dark';
  document.documentElement.setAttribute('data-theme',next);
  localStorage.setItem('bb_theme',next);
}
function renumber(tbody){
  let rank=1;
  tbody.querySelectorAll('tr').forEach(function(tr){
    if(tr.style.display==='none'){return;}
    const cell=tr.children[0];
    cell.textContent=rank; cell.setAttribute('data-sort', String(rank));
    tr.classList.remove('best');
    if(rank===1){tr.classList.add('best');}
    rank++;
  });
}
function filterRows(q){
  q=(q||'').toLowerCase();
  document.querySelectorAll('tbody tr.result-row').forEach(function(tr){
    const t=(tr.getAttribute('data-test')+' '+tr.getAttribute('data-code')+' '+tr.getAttribute('data-machine')+' '+tr.textContent).toLowerCase();
    tr.style.display = t.indexOf(q)>=0 ? '' : 'none';
  });
  document.querySelectorAll('tbody').forEach(renumber);
}
function sortTable(tableId,col,asc){
  const table=document.getElementById(tableId);
  const tbody=table.querySelector('tbody');
  const getVal=(tr)=>tr.children[col].getAttribute('data-sort')||tr.children[col].innerText;
  const rows=Array.from(tbody.querySelectorAll('tr')).filter(r=>r.style.display!=='none');
  rows.sort((a,b)=>{
    const va=getVal(a); const vb=getVal(b);
    const na=parseFloat(va); const nb=parseFloat(vb);
    const bothNum = !isNaN(na) && !isNaN(nb);
    const cmp = bothNum ? (na-nb) : va.localeCompare(vb);
    return asc?cmp:-cmp;
  });
  rows.forEach(r=>tbody.appendChild(r));
  renumber(tbody);
}
function onHeaderClick(tableId,col,th){
  const table=document.getElementById(tableId);
  const lastCol=table.getAttribute('data-sort-col');
  const lastAsc=table.getAttribute('data-sort-asc')==='true';
  let asc=true;
  if(String(col)===lastCol){ asc=!lastAsc; }
  sortTable(tableId,col,asc);
  table.setAttribute('data-sort-col', String(col));
  table.setAttribute('data-sort-asc', String(asc));
  const thead=table.querySelector('thead');
  if(thead){ thead.querySelectorAll('th').forEach(h=>h.classList.remove('sort-asc','sort-desc')); }
  if(th){ th.classList.add(asc?'sort-asc':'sort-desc'); }
}"#;

const SUN_ICON: &str = r#"<svg class="sun" viewBox="0 0 24 24" aria-hidden="true"><circle cx="12" cy="12" r="4"></circle><path d="M12 2v2M12 20v2M4.93 4.93l1.41 1.41M17.66 17.66l1.41 1.41M2 12h2M20 12h2M4.93 19.07l1.41-1.41M17.66 6.34l1.41-1.41"></path></svg>"#;

const MOON_ICON: &str = r#"<svg class="moon" viewBox="0 0 24 24" aria-hidden="true"><path d="M21 12.79A9 9 0 1 1 11.21 3a7 7 0 0 0 9.79 9.79Z"></path></svg>"#;

const LINK_ICON: &str = r#"<svg viewBox="0 0 24 24" aria-hidden="true"><path d="M10 14a5 5 0 0 0 7.07 0l2.12-2.12A5 5 0 0 0 14.1 4.9L13 6" /><path d="M14 10a5 5 0 0 0-7.07 0L4.8 12.12A5 5 0 0 0 9.9 19.2L11 18" /></svg>"#;

/// Render the full document with an explicit generation timestamp.
///
/// The timestamp is a parameter, not `Utc::now()`, so two renders over the
/// same inputs at the same stamp are byte-identical.
pub fn render_at(inputs: &ReportInputs<'_>, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    let all_records: Vec<&ResultRecord> = inputs.reduced.values().flatten().collect();
    let codes: HashSet<&str> = all_records.iter().map(|r| r.code.as_str()).collect();
    let machines: HashSet<&str> = all_records.iter().map(|r| r.machine.as_str()).collect();
    let last_date = all_records.iter().filter_map(|r| r.date).max();
    let last_date_str = match &last_date {
        Some(dt) => date::format_utc(dt),
        None => "N/A".to_string(),
    };

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("  <title>Benchboard</title>\n");
    writeln!(
        out,
        "  <link rel=\"icon\" type=\"image/png\" href=\"{}\">",
        escape_html(inputs.logo)
    )
    .unwrap();
    writeln!(out, "  <style>{STYLE}</style>").unwrap();
    writeln!(out, "  <script>{SCRIPT}</script>").unwrap();
    out.push_str("</head>\n<body>\n");

    // Topbar: brand, generation stamp, search, theme toggle.
    out.push_str("  <div class=\"topbar\"><div class=\"topbar-inner\">\n");
    writeln!(
        out,
        "    <div class=\"brand\"><img src=\"{}\" alt=\"Benchboard Logo\"><h1>Benchboard</h1><span class=\"muted\">Updated {}</span></div>",
        escape_html(inputs.logo),
        escape_html(&date::format_stamp(&generated_at))
    )
    .unwrap();
    out.push_str("    <div class=\"controls\">\n");
    out.push_str("      <input id=\"global-search\" class=\"search\" placeholder=\"Search code, machine, test, commit...\" oninput=\"filterRows(this.value)\">\n");
    writeln!(
        out,
        "      <button class=\"btn icon-btn\" onclick=\"toggleTheme()\" title=\"Toggle theme\" aria-label=\"Toggle theme\">{SUN_ICON}{MOON_ICON}</button>"
    )
    .unwrap();
    out.push_str("    </div>\n  </div></div>\n");
    out.push_str("  <div class=\"container\">\n");

    // Stat cards.
    out.push_str("  <div class=\"stats\">\n");
    for (label, value) in [
        ("Tests", inputs.reduced.len().to_string()),
        ("Results", all_records.len().to_string()),
        ("Codes", codes.len().to_string()),
        ("Machines", machines.len().to_string()),
        ("Last result", escape_html(&last_date_str)),
    ] {
        writeln!(
            out,
            "    <div class=\"card\"><div class=\"label\">{label}</div><div class=\"value\">{value}</div></div>"
        )
        .unwrap();
    }
    out.push_str("  </div>\n");

    // Sidebar navigation.
    out.push_str("  <div class=\"layout\">\n    <aside class=\"sidebar\">\n      <h3>Tests</h3>\n      <ul class=\"nav\">\n");
    for test in inputs.reduced.keys() {
        let test = escape_html(test);
        writeln!(out, "        <li><a href=\"#{test}\">{test}</a></li>").unwrap();
    }
    out.push_str("      </ul>\n    </aside>\n    <main>\n");

    if inputs.reduced.is_empty() {
        out.push_str("  <p>No results found in <code>results/</code>.</p>\n");
    } else {
        for (test, records) in inputs.reduced {
            let fallback;
            let definition = match inputs.registry.get(test) {
                Some(def) => def,
                None => {
                    fallback = BenchmarkDefinition::minimal(test);
                    &fallback
                }
            };
            render_section(&mut out, inputs, test, definition, records);
        }
    }

    out.push_str("    </main>\n  </div>\n");
    out.push_str("  <div class=\"footer container\">Generated by benchboard</div>\n");
    out.push_str("</body>\n</html>");
    out
}

/// One benchmark section: header, metadata, and the result table.
fn render_section(
    out: &mut String,
    inputs: &ReportInputs<'_>,
    test: &str,
    definition: &BenchmarkDefinition,
    records: &[ResultRecord],
) {
    let test_esc = escape_html(test);

    out.push_str("  <div class=\"test-header\">\n");
    writeln!(
        out,
        "    <h2 id=\"{test_esc}\">{}</h2>",
        escape_html(&definition.name)
    )
    .unwrap();
    if let Some(href) = &definition.readme_href {
        writeln!(
            out,
            "    <a class=\"small\" href=\"{}\" target=\"_blank\">README</a>",
            escape_html(href)
        )
        .unwrap();
    }
    out.push_str("  </div>\n");
    if !definition.description.is_empty() {
        writeln!(
            out,
            "  <div class=\"muted\">{}</div>",
            escape_html(&definition.description)
        )
        .unwrap();
    }
    if !definition.tags.is_empty() {
        out.push_str("  <div>");
        for tag in &definition.tags {
            write!(out, "<span class=\"chip\">{}</span> ", escape_html(tag)).unwrap();
        }
        out.push_str("</div>\n");
    }

    let keys = &definition.template_keys;
    let sort_key = definition.initial_sort_key();
    let table_id = format!("table-{test_esc}");

    // Seed the script's sort state when the benchmark declared a sortable
    // initial column; the rows themselves were already ordered server-side.
    let initial_sort_col = sort_key
        .and_then(|key| keys.iter().position(|k| k == key))
        .map(|idx| 3 + idx);
    write!(out, "  <table id=\"{table_id}\"").unwrap();
    if let Some(col) = initial_sort_col {
        let asc = definition.sort_dir == benchboard_core::SortDir::Asc;
        write!(out, " data-sort-col=\"{col}\" data-sort-asc=\"{asc}\"").unwrap();
    }
    out.push_str(">\n    <thead><tr>");

    // Rank column is intentionally not sortable.
    out.push_str("<th>Rank</th>");
    write!(
        out,
        "<th class=\"sortable\" onclick=\"onHeaderClick('{table_id}',1,this)\">Code</th>"
    )
    .unwrap();
    write!(
        out,
        "<th class=\"sortable\" onclick=\"onHeaderClick('{table_id}',2,this)\">Machine</th>"
    )
    .unwrap();
    for (idx, key) in keys.iter().enumerate() {
        let label = escape_html(&humanize(key));
        if BenchmarkDefinition::is_link_only(key) {
            write!(out, "<th>{label}</th>").unwrap();
        } else {
            let indicator = if sort_key == Some(key.as_str()) {
                match definition.sort_dir {
                    benchboard_core::SortDir::Asc => " sort-asc",
                    benchboard_core::SortDir::Desc => " sort-desc",
                }
            } else {
                ""
            };
            write!(
                out,
                "<th class=\"sortable{indicator}\" onclick=\"onHeaderClick('{table_id}',{},this)\">{label}</th>",
                3 + idx
            )
            .unwrap();
        }
    }
    if definition.has_data_artifact {
        out.push_str("<th>Plot</th>");
    }
    out.push_str("</tr></thead>\n    <tbody>\n");

    for (rank, record) in records.iter().enumerate() {
        let rank = rank + 1;
        let best = if rank == 1 { " best" } else { "" };
        write!(
            out,
            "      <tr class=\"result-row{best}\" data-test=\"{test_esc}\" data-code=\"{}\" data-machine=\"{}\">",
            escape_html(&record.code),
            escape_html(&record.machine)
        )
        .unwrap();

        write!(out, "<td data-sort=\"{rank}\">{rank}</td>").unwrap();

        let code = escape_html(&record.code);
        match inputs.code_urls.get(&record.code) {
            Some(url) if !url.is_empty() => write!(
                out,
                "<td data-sort=\"{code}\"><a href=\"{}\" target=\"_blank\">{code}</a></td>",
                escape_html(url)
            )
            .unwrap(),
            _ => write!(out, "<td data-sort=\"{code}\">{code}</td>").unwrap(),
        }

        let machine = escape_html(&record.machine);
        write!(
            out,
            "<td data-sort=\"{machine}\"><a href=\"{}/{code}/{machine}/machine.json\" target=\"_blank\">{machine}</a></td>",
            escape_html(inputs.results_href)
        )
        .unwrap();

        for key in keys {
            render_cell(out, record, key);
        }

        if definition.has_data_artifact {
            match &record.plot_href {
                Some(href) => {
                    let href = escape_html(href);
                    write!(
                        out,
                        "<td><a href=\"{href}\" target=\"_blank\"><img src=\"{href}\" alt=\"Plot\" style=\"max-width:150px;height:auto;display:block;cursor:pointer;\"></a></td>"
                    )
                    .unwrap();
                }
                None => out.push_str("<td>\u{2014}</td>"),
            }
        }
        out.push_str("</tr>\n");
    }

    out.push_str("    </tbody>\n  </table>\n");
}

/// One field cell: display value, sortable `data-sort` value, styling.
fn render_cell(out: &mut String, record: &ResultRecord, key: &str) {
    // Dates display as a day but sort on the epoch; commits display
    // truncated but sort on the full hash.
    let (display, sort) = match (key, &record.date) {
        ("date", Some(dt)) => (date::format_day(dt), format!("{}", dt.timestamp())),
        ("date", None) => {
            let raw = record.date_raw.clone().unwrap_or_default();
            (raw.clone(), raw)
        }
        _ => {
            let text = record
                .field(key)
                .map(FieldValue::display)
                .unwrap_or_default();
            let display = if key == "commit" && text.len() > COMMIT_DISPLAY_LEN {
                let cut = text
                    .char_indices()
                    .nth(COMMIT_DISPLAY_LEN)
                    .map(|(i, _)| i)
                    .unwrap_or(text.len());
                text[..cut].to_string()
            } else {
                text.clone()
            };
            (display, text)
        }
    };

    let class_attr = if matches!(key, "date" | "commit") {
        " class=\"nowrap\""
    } else {
        ""
    };

    if BenchmarkDefinition::is_link_only(key) && !sort.is_empty() {
        let url = escape_html(&sort);
        write!(
            out,
            "<td{class_attr} data-sort=\"{url}\"><a class=\"link-icon\" href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"Open link\">{LINK_ICON}</a></td>"
        )
        .unwrap();
    } else {
        write!(
            out,
            "<td{class_attr} data-sort=\"{}\">{}</td>",
            escape_html(&sort),
            escape_html(&display)
        )
        .unwrap();
    }
}
